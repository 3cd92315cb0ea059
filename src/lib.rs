
pub mod mesh;
pub mod gpu;
pub mod camera;
pub mod texture;
pub mod voxel;
pub mod chunk;
pub mod mesher;
pub mod worldgen;

use std::f32::consts::PI;
use std::fs;
use std::path;

use anyhow::Context;
use vek::*;
use winit::{
    event::*,
    event_loop::EventLoop,
    window::WindowBuilder,
};

use mesher::MeshedChunk;
use worldgen::BakeDescriptor;

const BAKE_DESC_FILE: &str = "bake.ron";

fn chunk_mesh_path(bake_dir: &path::Path, x: i64, z: i64) -> path::PathBuf{
    bake_dir.join(format!("chunk_{}_{}.mesh", x, z))
}

/// Generate, mesh and persist every chunk of the descriptor.
/// Meshing runs on the rayon pool; this thread only does the file writes.
pub fn bake_with_descriptor(desc: &BakeDescriptor, save_dir_path: path::PathBuf) -> anyhow::Result<()>{
    let bake_dir = save_dir_path.join(&desc.name);
    if !bake_dir.exists(){
        fs::create_dir_all(&bake_dir)?;
    }

    let start = std::time::Instant::now();

    let mut chunks = Vec::new();
    for (cx, cz) in desc.chunk_coords(){
        let chunk = worldgen::generate_chunk(desc, cx, cz)
            .with_context(|| format!("generating chunk ({}, {})", cx, cz))?;
        chunks.push(chunk);
    }

    let meshed = mesher::mesh_chunks(&chunks, desc.seed)?;

    let mut vertex_total = 0usize;
    for meshed_chunk in &meshed{
        vertex_total += meshed_chunk.mesh.vertex_count();
        let mesh_path = chunk_mesh_path(&bake_dir, meshed_chunk.x, meshed_chunk.z);
        let mut file = fs::File::create(&mesh_path)
            .with_context(|| format!("creating {:?}", mesh_path))?;
        meshed_chunk.mesh.to_writer(&mut file)?;
    }

    let desc_path = bake_dir.join(BAKE_DESC_FILE);
    let mut desc_file = fs::File::create(&desc_path)?;
    ron::ser::to_writer_pretty(&mut desc_file, desc, ron::ser::PrettyConfig::default())?;

    log::info!(
        "baked {}: {} chunks, {} vertices, {:.2}s",
        desc.name,
        meshed.len(),
        vertex_total,
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

pub fn bake(config_file: fs::File, save_dir_path: path::PathBuf) -> anyhow::Result<()>{
    let desc: BakeDescriptor = ron::de::from_reader(config_file).context("reading bake config")?;
    desc.dims.validate()?;
    bake_with_descriptor(&desc, save_dir_path)
}

pub fn list_bakes(save_path: path::PathBuf) -> anyhow::Result<()>{
    let mut names = Vec::new();
    for entry in fs::read_dir(save_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join(BAKE_DESC_FILE).exists(){
            if let Some(name) = path.file_name().and_then(|n| n.to_str()){
                names.push(name.to_string());
            }
        }
    }
    println!("Bakes:");
    for name in names{
        println!("{}", name);
    }
    Ok(())
}

fn load_bake_descriptor(bake_dir: &path::Path) -> anyhow::Result<BakeDescriptor>{
    let desc_path = bake_dir.join(BAKE_DESC_FILE);
    let desc_file = fs::File::open(&desc_path)
        .with_context(|| format!("opening bake descriptor {:?}", desc_path))?;
    Ok(ron::de::from_reader(desc_file)?)
}

/// Load baked meshes on the rayon pool and stream them to the render thread.
/// The sender side closes itself once every chunk file has been visited.
fn spawn_mesh_loader(bake_dir: path::PathBuf, desc: &BakeDescriptor) -> crossbeam_channel::Receiver<MeshedChunk>{
    use rayon::prelude::*;

    let (tx, rx) = crossbeam_channel::unbounded();
    let coords = desc.chunk_coords();

    std::thread::spawn(move ||{
        coords.par_iter().for_each_with(tx, |tx, (x, z)|{
            let mesh_path = chunk_mesh_path(&bake_dir, *x, *z);
            let mesh = fs::File::open(&mesh_path)
                .map_err(anyhow::Error::from)
                .and_then(|mut file| Ok(mesh::Mesh::from_reader(&mut file)?));
            match mesh{
                Ok(mesh) => {
                    //receiver gone means the window closed, just stop
                    tx.send(MeshedChunk{x: *x, z: *z, mesh}).ok();
                }
                Err(err) => {
                    log::warn!("skipping chunk ({}, {}): {}", x, z, err);
                }
            }
        });
    });

    rx
}

///control camera with mouse draging orbiting around a center point
/// wheel to zoom in and out
pub struct CameraOrbitController{
    pub center: Vec3<f32>,
    pub orbit_radius: f32,
    pub orbit_speed: f32,
    pub zoom_speed: f32,
    pub is_dragging: bool,

    pub yaw: f32,
    pub pitch: f32,
    pub wheel_input: f32,
    pub yaw_input: f32,
    pub pitch_input: f32,

    pub last_mouse_pos: Vec2<f32>,
}

impl CameraOrbitController{

    pub fn new(center: Vec3<f32>, orbit_radius: f32) -> Self{
        Self{
            center,
            orbit_radius,
            orbit_speed: 1.0,
            zoom_speed: 50.0,
            is_dragging: false,
            yaw: 0.0,
            pitch: -PI / 6.0,
            wheel_input: 0.0,
            yaw_input: 0.0,
            pitch_input: 0.0,
            last_mouse_pos: Vec2::zero(),
        }
    }

    ///dragging the mouse will orbit camera around center point
    pub fn input(&mut self, event: &WindowEvent){
        match event{
            WindowEvent::MouseInput{state, button, ..} => {
                if *button == MouseButton::Left{
                    self.is_dragging = *state == ElementState::Pressed;
                }
            },
            WindowEvent::CursorMoved{position, ..} => {
                let mouse_pos = Vec2::new(position.x as f32, position.y as f32);

                if self.is_dragging{
                    let delta = mouse_pos - self.last_mouse_pos;
                    self.yaw_input = delta.x;
                    self.pitch_input = delta.y;
                }

                self.last_mouse_pos = mouse_pos;
            }

            //mouse wheel to zoom in and out
            WindowEvent::MouseWheel{delta, ..} => {
                match delta{
                    MouseScrollDelta::LineDelta(_, y) => {
                        self.wheel_input = *y;
                    }
                    MouseScrollDelta::PixelDelta(pos) => {
                        self.wheel_input = pos.y as f32;
                    }
                }
            }
            _ => {}
        }
    }

    pub fn update_camera(&mut self, camera: &mut camera::Camera, delta_time: f32){
        camera.target = self.center;

        self.yaw += self.yaw_input * self.orbit_speed * delta_time;
        self.pitch += self.pitch_input * self.orbit_speed * delta_time;
        self.pitch = self.pitch.clamp(-PI/2.0 + 0.001, PI/2.0 - 0.001);

        //yaw pitch control camera rotation
        let quat = Quaternion::rotation_y(self.yaw) * Quaternion::rotation_x(self.pitch);

        self.orbit_radius -= self.wheel_input * self.zoom_speed * self.orbit_radius * delta_time * 0.1f32;
        self.orbit_radius = self.orbit_radius.max(1.0);

        camera.eye = self.center + quat * Vec3::unit_z() * self.orbit_radius;

        //clear input
        self.yaw_input = 0.0;
        self.pitch_input = 0.0;
        self.wheel_input = 0.0;
    }
}

struct State{
    gpu_agent: gpu::GpuAgent,
    camera: camera::Camera,
    camera_controller: CameraOrbitController,

    chunk_states: Vec<(i64, i64, mesh::MeshState)>,
    mesh_rx: crossbeam_channel::Receiver<MeshedChunk>,
    chunk_render_pipeline: wgpu::RenderPipeline,
}

impl State {
    pub fn new(gpu_agent: gpu::GpuAgent, desc: &BakeDescriptor, mesh_rx: crossbeam_channel::Receiver<MeshedChunk>) -> Self{
        let world_span = (desc.chunk_radius * 2 * desc.dims.x as i64) as f32;
        let center = Vec3::new(0.0, desc.height_scale * 0.5, 0.0);

        let camera = camera::Camera::new(
            center + Vec3::new(0.0, world_span * 0.3, world_span),
            center,
            Vec3::unit_y(),
            camera::Projection{
                aspect: gpu_agent.surface_aspect(),
                fovy: PI/4.0,
                znear: 0.1,
                zfar: 4000.0,
            },
        );
        let camera_controller = CameraOrbitController::new(center, world_span);

        let chunk_pipeline_layout = gpu_agent.create_pipeline_layout(
            &[],
            &[camera::Camera::PUSH_CONSTANT_RANGE],
            "chunk pipeline layout"
        );
        use mesh::VertexLayout;
        let chunk_render_pipeline = gpu_agent.create_render_pipeline(
            &chunk_pipeline_layout,
            &[mesh::MeshVertex::vertex_layout::<0>()],
            &gpu_agent.create_shader(include_str!("shaders/chunk.wgsl"), "chunk shader"),
            gpu_agent.config.format,
            texture::Texture::DEPTH_FORMAT,
            Some(wgpu::Face::Back),
            "chunk render pipeline"
        );

        Self{
            gpu_agent,
            camera,
            camera_controller,
            chunk_states: Vec::new(),
            mesh_rx,
            chunk_render_pipeline,
        }
    }

    pub fn input(&mut self, event: &WindowEvent){
        self.camera_controller.input(event);
    }

    /// Upload meshes the loader pool has finished. This is the only place
    /// mesh data crosses onto the GPU.
    fn drain_finished_meshes(&mut self){
        while let Ok(meshed) = self.mesh_rx.try_recv(){
            if meshed.mesh.is_empty(){
                continue;
            }
            log::debug!(
                "uploading chunk ({}, {}): {} vertices",
                meshed.x, meshed.z, meshed.mesh.vertex_count()
            );
            let state = mesh::MeshState::new(&self.gpu_agent, &meshed.mesh);
            self.chunk_states.push((meshed.x, meshed.z, state));
        }
    }

    pub fn update(&mut self, delta_time: f32){
        self.camera_controller.update_camera(&mut self.camera, delta_time);
        self.camera.update();
        self.drain_finished_meshes();
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError>{
        let output = self.gpu_agent.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.gpu_agent.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor{
                label: Some("Render Pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.25,
                                g: 0.55,
                                b: 0.8,
                                a: 1.0,
                            }),
                            store: true,
                        },
                    })
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu_agent.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            render_pass.set_pipeline(&self.chunk_render_pipeline);
            render_pass.set_push_constants(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                0,
                self.camera.get_uniform_data()
            );
            for (_x, _z, chunk_state) in &self.chunk_states{
                render_pass.set_vertex_buffer(0, chunk_state.vertex_buffer.slice(..));
                render_pass.set_index_buffer(chunk_state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..chunk_state.index_count, 0, 0..1);
            }
        }

        self.gpu_agent.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>){
        self.gpu_agent.resize(new_size);
        self.camera.projection.aspect = self.gpu_agent.surface_aspect();
    }

    pub fn window(&self) -> &winit::window::Window{
        &self.gpu_agent.window
    }
}

pub async fn run(save_dir_path: path::PathBuf, bake_name: &str) -> anyhow::Result<()>{
    let bake_dir = save_dir_path.join(bake_name);
    let desc = load_bake_descriptor(&bake_dir)?;
    let mesh_rx = spawn_mesh_loader(bake_dir, &desc);

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(format!("chunkmesh - {}", desc.name))
        .build(&event_loop)?;
    let gpu_agent = gpu::GpuAgent::new(window).await;

    let mut state = State::new(gpu_agent, &desc, mesh_rx);

    let mut last_time = std::time::Instant::now();
    event_loop.run(move |event, _, control_flow|
    {
        control_flow.set_poll();

        match event {
            Event::WindowEvent {
                event,
                ..
            } => {
                state.input(&event);
                match event {
                    WindowEvent::CloseRequested => control_flow.set_exit(),

                    WindowEvent::Resized(physical_size) => {
                        state.resize(physical_size);
                    }
                    WindowEvent::ScaleFactorChanged {new_inner_size, .. } => {
                        state.resize(*new_inner_size);
                    }
                    _ => ()
                }
            }

            Event::RedrawRequested(window_id) if window_id == state.window().id() => {
                let now = std::time::Instant::now();
                let delta_time = now.duration_since(last_time).as_secs_f32();
                last_time = now;

                state.update(delta_time);
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.gpu_agent.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => control_flow.set_exit(),
                    //upload/present failures are GPU-side, keep them apart
                    //from mesh generation errors and just report
                    Err(e) => log::error!("surface error: {:?}", e)
                }
            }

            Event::MainEventsCleared => {
                state.window().request_redraw();
            }

            _ => {}
        }
    });
}

#[cfg(test)]
mod test{
    use super::*;
    use crate::chunk::ChunkDims;
    use crate::worldgen::NoiseDescriptor;

    fn tiny_desc(name: &str) -> BakeDescriptor{
        BakeDescriptor{
            name: name.to_string(),
            dims: ChunkDims::new(8, 32, 8),
            chunk_radius: 1,
            seed: 42,
            noise: NoiseDescriptor{
                seed: 3,
                frequency: 0.02,
                lacunarity: 2.0,
                persistence: 0.5,
                octaves: 4,
            },
            height_scale: 16.0,
        }
    }

    #[test]
    fn test_bake_writes_descriptor_and_meshes(){
        let save_dir = std::env::temp_dir().join("chunkmesh_test_bake");
        fs::remove_dir_all(&save_dir).ok();
        fs::create_dir_all(&save_dir).unwrap();

        let desc = tiny_desc("tiny");
        bake_with_descriptor(&desc, save_dir.clone()).unwrap();

        let bake_dir = save_dir.join("tiny");
        let loaded = load_bake_descriptor(&bake_dir).unwrap();
        assert_eq!(loaded.name, desc.name);
        assert_eq!(loaded.dims, desc.dims);

        for (x, z) in desc.chunk_coords(){
            let mesh_path = chunk_mesh_path(&bake_dir, x, z);
            let mut file = fs::File::open(&mesh_path).unwrap();
            let mesh = mesh::Mesh::from_reader(&mut file).unwrap();
            assert!(!mesh.is_empty());
            assert_eq!(mesh.triangle_count() * 3, mesh.indices.len());
        }

        fs::remove_dir_all(&save_dir).ok();
    }

    #[test]
    fn test_baked_mesh_matches_fresh_generation(){
        let save_dir = std::env::temp_dir().join("chunkmesh_test_rebake");
        fs::remove_dir_all(&save_dir).ok();
        fs::create_dir_all(&save_dir).unwrap();

        let desc = tiny_desc("rebake");
        bake_with_descriptor(&desc, save_dir.clone()).unwrap();

        let chunk = worldgen::generate_chunk(&desc, 0, 0).unwrap();
        let fresh = mesher::generate_mesh(&chunk, desc.seed).unwrap();

        let mesh_path = chunk_mesh_path(&save_dir.join("rebake"), 0, 0);
        let mut file = fs::File::open(mesh_path).unwrap();
        let baked = mesh::Mesh::from_reader(&mut file).unwrap();
        assert_eq!(baked, fresh);

        fs::remove_dir_all(&save_dir).ok();
    }
}
