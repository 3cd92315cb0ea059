use rayon::prelude::*;
use thiserror::Error;

use crate::chunk::{Chunk, ChunkDims};
use crate::mesh::{Mesh, MeshVertex};
use crate::voxel::Face;

#[derive(Debug, Error)]
pub enum MeshError{
    #[error("invalid chunk bounds: dims {dims:?} do not match {voxel_num} voxels")]
    InvalidChunkBounds{
        dims: ChunkDims,
        voxel_num: usize,
    },

    #[error("voxel position {pos:?} outside chunk dims {dims:?}")]
    VoxelOutOfBounds{
        pos: [u32; 3],
        dims: ChunkDims,
    },

    #[error("mesh buffer allocation of {bytes} bytes failed")]
    Allocation{
        bytes: usize,
    },
}

/// A generated mesh tagged with the chunk coordinates it came from.
pub struct MeshedChunk{
    pub x: i64,
    pub z: i64,
    pub mesh: Mesh,
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Turn one chunk's voxel grid into a triangle mesh.
///
/// Pure transform: reads the grid, allocates fresh buffers, touches no GPU
/// state. Every face flagged visible contributes exactly one quad (4 vertices,
/// 2 triangles) with the outward face normal and the voxel's color; invisible
/// faces contribute nothing. Vertex positions are world-space.
///
/// `seed` is reserved for procedural variation and does not yet affect the
/// output, so equal grids and seeds produce bit-identical buffers.
pub fn generate_mesh(chunk: &Chunk, seed: u64) -> Result<Mesh, MeshError>{
    chunk.dims.validate()?;
    if chunk.voxels().len() != chunk.dims.volume(){
        return Err(MeshError::InvalidChunkBounds{
            dims: chunk.dims,
            voxel_num: chunk.voxels().len(),
        });
    }

    let quad_num: usize = chunk
        .voxels()
        .iter()
        .map(|v| v.visible_faces.iter().filter(|visible| **visible).count())
        .sum();

    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    vertices.try_reserve_exact(quad_num * 4).map_err(|_| MeshError::Allocation{
        bytes: quad_num * 4 * std::mem::size_of::<MeshVertex>(),
    })?;
    indices.try_reserve_exact(quad_num * 6).map_err(|_| MeshError::Allocation{
        bytes: quad_num * 6 * std::mem::size_of::<u32>(),
    })?;

    let origin = chunk.origin();
    let tex_coords = Face::corner_tex_coords();

    for y in 0..chunk.dims.y{
        for z in 0..chunk.dims.z{
            for x in 0..chunk.dims.x{
                let voxel = match chunk.get(x, y, z){
                    Some(v) => v,
                    None => continue,
                };
                if voxel.visible_faces == [false; 6]{
                    continue;
                }

                let color = voxel.color.to_f32_array();
                for face in Face::ALL.iter(){
                    if !voxel.is_face_visible(*face){
                        continue;
                    }

                    let base = vertices.len() as u32;
                    let normal = face.normal();
                    for (corner, tex_coord) in face.corners().iter().zip(tex_coords.iter()){
                        vertices.push(MeshVertex{
                            pos: [
                                origin.x + x as f32 + corner[0],
                                origin.y + y as f32 + corner[1],
                                origin.z + z as f32 + corner[2],
                            ],
                            tex_coord: *tex_coord,
                            normal,
                            color,
                        });
                    }
                    indices.extend(QUAD_INDICES.iter().map(|i| base + i));
                }
            }
        }
    }

    log::trace!(
        "meshed chunk ({}, {}): {} quads, seed {}",
        chunk.x, chunk.z, quad_num, seed
    );

    Ok(Mesh{vertices, indices})
}

/// Mesh many chunks on the rayon pool. Meshing is per-chunk pure compute with
/// no shared state; callers upload the results from the GPU thread afterwards.
pub fn mesh_chunks(chunks: &[Chunk], seed: u64) -> Result<Vec<MeshedChunk>, MeshError>{
    chunks
        .par_iter()
        .map(|chunk|{
            let mesh = generate_mesh(chunk, seed)?;
            Ok(MeshedChunk{
                x: chunk.x,
                z: chunk.z,
                mesh,
            })
        })
        .collect()
}
