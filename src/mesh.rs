use serde::{Serialize, Deserialize};
use wgpu::util::DeviceExt;
use crate::gpu;

pub trait VertexLayout{
    fn vertex_layout<const LOCATION: u32>() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct MeshVertex{
    pub pos: [f32; 3],
    pub tex_coord: [f32; 2],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Default for MeshVertex{
    fn default() -> Self{
        Self{
            pos: [0.0, 0.0, 0.0],
            tex_coord: [0.0, 0.0],
            normal: [0.0, 0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl VertexLayout for MeshVertex {

    ///location length : 4
    fn vertex_layout<const LOCATION: u32>() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout{
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute{
                    offset: 0,
                    shader_location: 0 + LOCATION,
                    format: wgpu::VertexFormat::Float32x3
                },
                wgpu::VertexAttribute{
                    offset: mem::size_of::<[f32; 3]>() as u64,
                    shader_location: 1 + LOCATION,
                    format: wgpu::VertexFormat::Float32x2
                },
                wgpu::VertexAttribute{
                    offset: mem::size_of::<[f32; 5]>() as u64,
                    shader_location: 2 + LOCATION,
                    format: wgpu::VertexFormat::Float32x3
                },
                wgpu::VertexAttribute{
                    offset: mem::size_of::<[f32; 8]>() as u64,
                    shader_location: 3 + LOCATION,
                    format: wgpu::VertexFormat::Float32x4
                }
            ]
        }
    }
}

/// CPU-side triangle mesh. Plain data, no GPU handles; uploading is the
/// separate, explicit [`MeshState::new`] step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh{
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh{
    pub fn vertex_count(&self) -> usize{
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize{
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool{
        self.vertices.is_empty()
    }

    pub fn to_writer<W>(&self, writer: &mut W) -> Result<(), bincode::Error> where W: std::io::Write{
        bincode::serialize_into(writer, self)
    }

    pub fn from_reader<R>(reader: &mut R) -> Result<Self, bincode::Error> where R: std::io::Read{
        bincode::deserialize_from(reader)
    }

    #[allow(dead_code)]
    pub fn save_obj_file<P>(&self, path: P) -> Result<(), std::io::Error> where P: AsRef<std::path::Path>{
        use std::io::Write;
        let mut file = std::fs::File::create(path)?;
        for vertex in &self.vertices{
            let pos = vertex.pos;
            writeln!(file, "v {} {} {}", pos[0], pos[1], pos[2])?;
        }
        for vertex in &self.vertices{
            let n = vertex.normal;
            writeln!(file, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for i in (0..self.indices.len()).step_by(3){
            writeln!(
                file,
                "f {} {} {}",
                self.indices[i] + 1,
                self.indices[i + 1] + 1,
                self.indices[i + 2] + 1
            )?;
        }
        Ok(())
    }
}

/// GPU-resident copy of a [`Mesh`]. Build this on the thread that owns the
/// [`gpu::GpuAgent`], never on mesher workers.
pub struct MeshState{
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshState {
    pub fn new(agent: &gpu::GpuAgent, mesh: &Mesh) -> Self {
        let vertex_buffer = agent.device.create_buffer_init(&wgpu::util::BufferInitDescriptor{
            label: Some("chunk vertex buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = agent.device.create_buffer_init(&wgpu::util::BufferInitDescriptor{
            label: Some("chunk index buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self{
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}
