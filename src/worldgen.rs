use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Serialize, Deserialize};

use crate::chunk::{Chunk, ChunkDims};
use crate::mesher::MeshError;
use crate::voxel::{Rgba, Voxel, VoxelMaterial};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseDescriptor{
    pub seed: u32,
    pub frequency: f64,
    pub lacunarity: f64,
    pub persistence: f64,
    pub octaves: usize,
}

impl NoiseDescriptor{
    pub fn build(&self) -> Fbm<Perlin>{
        Fbm::<Perlin>::new(self.seed)
            .set_frequency(self.frequency)
            .set_lacunarity(self.lacunarity)
            .set_persistence(self.persistence)
            .set_octaves(self.octaves)
    }
}

/// One bake = a square of chunks around the origin, all generated from the
/// same noise field and meshed with the same seed.
///
/// ```ron
/// BakeDescriptor(
///     name: "hills",
///     dims: ChunkDims(x: 16, y: 256, z: 16),
///     chunk_radius: 4,
///     seed: 69420,
///     noise: NoiseDescriptor(seed: 7, frequency: 0.008, lacunarity: 2.0, persistence: 0.5, octaves: 6),
///     height_scale: 96.0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BakeDescriptor{
    pub name: String,
    pub dims: ChunkDims,
    pub chunk_radius: i64,
    pub seed: u64,
    pub noise: NoiseDescriptor,
    pub height_scale: f32,
}

impl Default for BakeDescriptor{
    fn default() -> Self{
        Self{
            name: "hills".to_string(),
            dims: ChunkDims::new(16, 256, 16),
            chunk_radius: 4,
            seed: 69420,
            noise: NoiseDescriptor{
                seed: 7,
                frequency: 0.008,
                lacunarity: 2.0,
                persistence: 0.5,
                octaves: 6,
            },
            height_scale: 96.0,
        }
    }
}

impl BakeDescriptor{
    /// chunk coordinates covered by this bake, row by row
    pub fn chunk_coords(&self) -> Vec<(i64, i64)>{
        let mut coords = Vec::new();
        for cz in -self.chunk_radius..self.chunk_radius{
            for cx in -self.chunk_radius..self.chunk_radius{
                coords.push((cx, cz));
            }
        }
        coords
    }
}

fn column_height(fbm: &Fbm<Perlin>, wx: i64, wz: i64, height_scale: f32, max_y: u32) -> u32{
    if max_y == 0{
        return 0;
    }
    let value = fbm.get([wx as f64, wz as f64]) as f32;
    let height = ((value + 1.0) * 0.5 * height_scale) as u32;
    height.clamp(1, max_y)
}

fn material_for_depth(y: u32, surface: u32) -> VoxelMaterial{
    if y + 1 == surface{
        VoxelMaterial::Grass
    }
    else if y + 4 >= surface{
        VoxelMaterial::Dirt
    }
    else{
        VoxelMaterial::Stone
    }
}

fn color_for(material: VoxelMaterial, wx: i64, y: u32, wz: i64) -> Rgba{
    //cheap per-position shade so neighboring columns read as separate blocks
    let shade = ((wx * 7 + wz * 13 + y as i64 * 3).rem_euclid(32)) as u8;
    match material{
        VoxelMaterial::Grass => Rgba::new(48 + shade, 160 + shade, 56, 255),
        VoxelMaterial::Dirt => Rgba::new(110 + shade, 80 + shade / 2, 48, 255),
        VoxelMaterial::Stone => Rgba::new(96 + shade, 96 + shade, 100 + shade, 255),
        VoxelMaterial::Air => Rgba::new(0, 0, 0, 0),
    }
}

/// Fill one chunk from the descriptor's noise field and run the
/// face-visibility pass so it is ready for the mesher.
pub fn generate_chunk(desc: &BakeDescriptor, cx: i64, cz: i64) -> Result<Chunk, MeshError>{
    let mut chunk = Chunk::new(cx, cz, desc.dims)?;
    let fbm = desc.noise.build();

    for z in 0..desc.dims.z{
        for x in 0..desc.dims.x{
            let wx = cx * desc.dims.x as i64 + x as i64;
            let wz = cz * desc.dims.z as i64 + z as i64;
            //keep one layer of air headroom so the surface is always meshable
            let surface = column_height(&fbm, wx, wz, desc.height_scale, desc.dims.y.saturating_sub(1));

            for y in 0..surface{
                let material = material_for_depth(y, surface);
                let voxel = Voxel::new(material, color_for(material, wx, y, wz));
                chunk.set(x, y, z, voxel)?;
            }
        }
    }

    chunk.update_face_visibility();
    Ok(chunk)
}

#[cfg(test)]
mod test{
    use super::*;
    use crate::voxel::Face;

    fn small_desc() -> BakeDescriptor{
        BakeDescriptor{
            dims: ChunkDims::new(8, 64, 8),
            chunk_radius: 1,
            height_scale: 32.0,
            ..BakeDescriptor::default()
        }
    }

    #[test]
    fn test_chunk_coords_cover_the_square(){
        let desc = small_desc();
        let coords = desc.chunk_coords();
        assert_eq!(coords.len(), 4);
        assert!(coords.contains(&(-1, -1)));
        assert!(coords.contains(&(0, 0)));
        assert!(!coords.contains(&(1, 0)));
    }

    #[test]
    fn test_generated_columns_are_grounded(){
        let desc = small_desc();
        let chunk = generate_chunk(&desc, 0, 0).unwrap();

        for z in 0..desc.dims.z{
            for x in 0..desc.dims.x{
                //bedrock layer always solid
                assert!(chunk.get(x, 0, z).unwrap().material.is_solid());
                //column tops out below the grid ceiling
                assert!(!chunk.get(x, desc.dims.y - 1, z).unwrap().material.is_solid());
            }
        }
    }

    #[test]
    fn test_surface_voxels_are_grass_and_face_up(){
        let desc = small_desc();
        let chunk = generate_chunk(&desc, 0, 0).unwrap();

        for z in 0..desc.dims.z{
            for x in 0..desc.dims.x{
                let mut surface = None;
                for y in (0..desc.dims.y).rev(){
                    if chunk.get(x, y, z).unwrap().material.is_solid(){
                        surface = Some(y);
                        break;
                    }
                }
                let y = surface.expect("column has no solid voxel");
                let top = chunk.get(x, y, z).unwrap();
                assert_eq!(top.material, VoxelMaterial::Grass);
                assert!(top.is_face_visible(Face::Up));
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic(){
        let desc = small_desc();
        let a = generate_chunk(&desc, 2, -3).unwrap();
        let b = generate_chunk(&desc, 2, -3).unwrap();
        assert_eq!(a.voxels(), b.voxels());
    }

    #[test]
    fn test_descriptor_ron_round_trip(){
        let desc = BakeDescriptor::default();
        let text = ron::ser::to_string(&desc).unwrap();
        let loaded: BakeDescriptor = ron::de::from_str(&text).unwrap();
        assert_eq!(loaded.name, desc.name);
        assert_eq!(loaded.dims, desc.dims);
        assert_eq!(loaded.seed, desc.seed);
    }
}
