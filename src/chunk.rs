use serde::{Serialize, Deserialize};
use vek::*;

use crate::mesher::MeshError;
use crate::voxel::{Face, Voxel};

/// Chunk grid extents. Always configuration, never a hard-coded constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDims{
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl ChunkDims{
    /// Upper bound keeps the worst-case vertex count (6 faces * 4 vertices
    /// per voxel) addressable by u32 mesh indices.
    pub const MAX_VOLUME: usize = (u32::MAX / 24) as usize;

    pub const fn new(x: u32, y: u32, z: u32) -> Self{
        Self{x, y, z}
    }

    pub fn volume(&self) -> usize{
        self.x as usize * self.y as usize * self.z as usize
    }

    pub fn validate(&self) -> Result<(), MeshError>{
        if self.x == 0 || self.y == 0 || self.z == 0{
            return Err(MeshError::InvalidChunkBounds{
                dims: *self,
                voxel_num: 0,
            });
        }

        let volume = (self.x as usize)
            .checked_mul(self.y as usize)
            .and_then(|v| v.checked_mul(self.z as usize));
        match volume{
            Some(v) if v <= Self::MAX_VOLUME => Ok(()),
            _ => Err(MeshError::InvalidChunkBounds{
                dims: *self,
                voxel_num: 0,
            }),
        }
    }
}

/// One column of voxels at integer chunk coordinates (x, z) in the world
/// chunk grid. The grid is dense, x fastest, then z, then y.
pub struct Chunk{
    pub dims: ChunkDims,
    pub x: i64,
    pub z: i64,
    voxels: Vec<Voxel>,
}

impl Chunk{
    pub fn new(x: i64, z: i64, dims: ChunkDims) -> Result<Self, MeshError>{
        dims.validate()?;
        Ok(Self{
            dims,
            x,
            z,
            voxels: vec![Voxel::AIR; dims.volume()],
        })
    }

    /// World-space position of voxel (0, 0, 0).
    pub fn origin(&self) -> Vec3<f32>{
        Vec3::new(
            (self.x * self.dims.x as i64) as f32,
            0.0,
            (self.z * self.dims.z as i64) as f32,
        )
    }

    pub fn voxels(&self) -> &[Voxel]{
        &self.voxels
    }

    fn index_of(&self, x: u32, y: u32, z: u32) -> Option<usize>{
        if x < self.dims.x && y < self.dims.y && z < self.dims.z{
            let dx = self.dims.x as usize;
            let dz = self.dims.z as usize;
            Some((y as usize * dz + z as usize) * dx + x as usize)
        }
        else{
            None
        }
    }

    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<&Voxel>{
        self.index_of(x, y, z).map(|i| &self.voxels[i])
    }

    pub fn get_mut(&mut self, x: u32, y: u32, z: u32) -> Option<&mut Voxel>{
        self.index_of(x, y, z).map(move |i| &mut self.voxels[i])
    }

    pub fn set(&mut self, x: u32, y: u32, z: u32, voxel: Voxel) -> Result<(), MeshError>{
        match self.index_of(x, y, z){
            Some(i) => {
                self.voxels[i] = voxel;
                Ok(())
            }
            None => Err(MeshError::VoxelOutOfBounds{
                pos: [x, y, z],
                dims: self.dims,
            }),
        }
    }

    fn neighbor_is_solid(&self, x: u32, y: u32, z: u32, face: Face) -> bool{
        let offset = face.offset();
        let nx = x as i64 + offset[0];
        let ny = y as i64 + offset[1];
        let nz = z as i64 + offset[2];
        if nx < 0 || ny < 0 || nz < 0{
            return false;
        }
        self.get(nx as u32, ny as u32, nz as u32)
            .map(|v| v.material.is_solid())
            .unwrap_or(false)
    }

    /// Face-culling pass: a solid voxel's face is visible iff the neighbor it
    /// looks at is air or outside this chunk. Neighboring chunks are not
    /// consulted, shared boundary faces stay visible on both sides.
    pub fn update_face_visibility(&mut self){
        for y in 0..self.dims.y{
            for z in 0..self.dims.z{
                for x in 0..self.dims.x{
                    let solid = self.get(x, y, z).map(|v| v.material.is_solid()).unwrap_or(false);
                    let mut visible_faces = [false; crate::voxel::FACE_NUM];
                    if solid{
                        for face in Face::ALL.iter(){
                            visible_faces[face.index()] = !self.neighbor_is_solid(x, y, z, *face);
                        }
                    }

                    if let Some(voxel) = self.get_mut(x, y, z){
                        voxel.visible_faces = visible_faces;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test{
    use super::*;
    use crate::voxel::{Rgba, VoxelMaterial};

    fn stone() -> Voxel{
        Voxel::new(VoxelMaterial::Stone, Rgba::WHITE)
    }

    #[test]
    fn test_dims_validate(){
        assert!(ChunkDims::new(16, 256, 16).validate().is_ok());
        assert!(ChunkDims::new(0, 256, 16).validate().is_err());
        assert!(ChunkDims::new(16, 0, 16).validate().is_err());
        assert!(ChunkDims::new(u32::MAX, u32::MAX, u32::MAX).validate().is_err());

        //a 65536-deep column fits the index budget,
        //it just has to be asked for explicitly
        assert!(ChunkDims::new(16, 65536, 16).validate().is_ok());
    }

    #[test]
    fn test_chunk_indexing(){
        let dims = ChunkDims::new(4, 8, 4);
        let mut chunk = Chunk::new(0, 0, dims).unwrap();
        assert_eq!(chunk.voxels().len(), dims.volume());

        assert!(chunk.get(3, 7, 3).is_some());
        assert!(chunk.get(4, 0, 0).is_none());
        assert!(chunk.get(0, 8, 0).is_none());
        assert!(chunk.get(0, 0, 4).is_none());

        chunk.set(1, 2, 3, stone()).unwrap();
        assert_eq!(chunk.get(1, 2, 3).unwrap().material, VoxelMaterial::Stone);
        assert_eq!(chunk.get(3, 2, 1).unwrap().material, VoxelMaterial::Air);

        assert!(chunk.set(4, 0, 0, stone()).is_err());
    }

    #[test]
    fn test_chunk_origin(){
        let dims = ChunkDims::new(16, 64, 16);
        let chunk = Chunk::new(-2, 3, dims).unwrap();
        assert_eq!(chunk.origin(), Vec3::new(-32.0, 0.0, 48.0));
    }

    #[test]
    fn test_visibility_lone_voxel_shows_all_faces(){
        let dims = ChunkDims::new(8, 8, 8);
        let mut chunk = Chunk::new(0, 0, dims).unwrap();
        chunk.set(4, 4, 4, stone()).unwrap();
        chunk.update_face_visibility();

        let voxel = chunk.get(4, 4, 4).unwrap();
        assert_eq!(voxel.visible_faces, [true; 6]);
    }

    #[test]
    fn test_visibility_enclosed_voxel_shows_nothing(){
        let dims = ChunkDims::new(4, 4, 4);
        let mut chunk = Chunk::new(0, 0, dims).unwrap();
        for y in 0..4{
            for z in 0..4{
                for x in 0..4{
                    chunk.set(x, y, z, stone()).unwrap();
                }
            }
        }
        chunk.update_face_visibility();

        //center voxels are fully enclosed
        assert_eq!(chunk.get(1, 1, 1).unwrap().visible_faces, [false; 6]);
        assert_eq!(chunk.get(2, 2, 2).unwrap().visible_faces, [false; 6]);

        //corner voxel shows its three boundary faces
        let corner = chunk.get(0, 0, 0).unwrap();
        assert!(corner.is_face_visible(Face::Down));
        assert!(corner.is_face_visible(Face::North));
        assert!(corner.is_face_visible(Face::West));
        assert!(!corner.is_face_visible(Face::Up));
        assert!(!corner.is_face_visible(Face::South));
        assert!(!corner.is_face_visible(Face::East));
    }

    #[test]
    fn test_visibility_air_has_no_faces(){
        let dims = ChunkDims::new(4, 4, 4);
        let mut chunk = Chunk::new(0, 0, dims).unwrap();
        chunk.set(1, 1, 1, stone()).unwrap();
        chunk.update_face_visibility();

        assert_eq!(chunk.get(0, 0, 0).unwrap().visible_faces, [false; 6]);
        assert_eq!(chunk.get(1, 2, 1).unwrap().visible_faces, [false; 6]);
    }

    #[test]
    fn test_visibility_two_touching_voxels_cull_shared_faces(){
        let dims = ChunkDims::new(8, 8, 8);
        let mut chunk = Chunk::new(0, 0, dims).unwrap();
        chunk.set(3, 3, 3, stone()).unwrap();
        chunk.set(4, 3, 3, stone()).unwrap();
        chunk.update_face_visibility();

        let left = chunk.get(3, 3, 3).unwrap();
        let right = chunk.get(4, 3, 3).unwrap();
        assert!(!left.is_face_visible(Face::East));
        assert!(!right.is_face_visible(Face::West));
        assert!(left.is_face_visible(Face::West));
        assert!(right.is_face_visible(Face::East));
        assert!(left.is_face_visible(Face::Up));
        assert!(right.is_face_visible(Face::Up));
    }
}
