//! Model viewer: loads a Wavefront OBJ, renders it with the mesh pipeline,
//! and orbits the camera with the mouse.
//!
//! Usage: `kiln-viewer [model.obj] [texture.png]`
//! With no arguments the built-in demo cube is shown. The texture, if given,
//! is assigned to the model's first submesh.

use anyhow::{Context, Result};
use glam::Vec3;

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use kiln_engine::core::{App, AppControl, FrameCtx};
use kiln_engine::device::GpuInit;
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::math::{build_uniforms, rotation, scaling, translation, OrbitCamera};
use kiln_engine::mesh::{parse_obj, CpuMesh, GpuMesh};
use kiln_engine::render::pipelines::{MeshRenderer, PrimitiveRenderer};
use kiln_engine::render::{Uniforms, Vertex};
use kiln_engine::texture::Texture;
use kiln_engine::window::{Runtime, RuntimeConfig};

const DEMO_MODEL: &str = include_str!("../assets/cube.obj");

/// Drag-to-orbit sensitivity, radians per physical pixel.
const ORBIT_SPEED: f32 = 0.008;
/// Model spin speed, radians per second.
const SPIN_SPEED: f32 = 0.6;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let model_path = args.next();
    let texture_path = args.next();

    let source = match &model_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model {path:?}"))?,
        None => DEMO_MODEL.to_string(),
    };

    let cpu_mesh = parse_obj(&source)?;
    log::info!(
        "model loaded: {} vertices, {} triangles, {} submeshes",
        cpu_mesh.vertex_count(),
        cpu_mesh.indices.len() / 3,
        cpu_mesh.submeshes.len()
    );

    let texture_png = texture_path
        .map(|path| {
            std::fs::read(&path).with_context(|| format!("failed to read texture {path:?}"))
        })
        .transpose()?;

    let title = model_path.unwrap_or_else(|| "demo cube".to_string());

    Runtime::run(
        RuntimeConfig {
            title: format!("kiln viewer — {title}"),
            ..Default::default()
        },
        GpuInit::default(),
        ViewerApp::new(cpu_mesh, texture_png),
    )
}

struct ViewerApp {
    cpu_mesh: CpuMesh,
    texture_png: Option<Vec<u8>>,

    // GPU-side state, created lazily on the first frame.
    mesh: Option<GpuMesh>,
    mesh_renderer: MeshRenderer,
    primitive_renderer: PrimitiveRenderer,

    camera: OrbitCamera,
    dragging: bool,
    cursor: Option<(f64, f64)>,
    spinning: bool,
    angle: f32,
}

impl ViewerApp {
    fn new(cpu_mesh: CpuMesh, texture_png: Option<Vec<u8>>) -> Self {
        Self {
            cpu_mesh,
            texture_png,
            mesh: None,
            mesh_renderer: MeshRenderer::new(),
            primitive_renderer: PrimitiveRenderer::new(),
            camera: OrbitCamera::new(Vec3::ZERO, 3.0),
            dragging: false,
            cursor: None,
            spinning: true,
            angle: 0.0,
        }
    }

    fn ensure_gpu_mesh(&mut self, ctx: &FrameCtx<'_, '_>) -> Result<()> {
        if self.mesh.is_some() {
            return Ok(());
        }

        let mesh = GpuMesh::upload(ctx.gpu.device(), &self.cpu_mesh, "viewer model")?;

        if let Some(bytes) = self.texture_png.take() {
            let texture =
                Texture::from_png_bytes(ctx.gpu.device(), ctx.gpu.queue(), &bytes, "viewer texture")
                    .context("failed to load texture")?;
            log::info!("texture bound to submesh 0: {:?}", texture.size());
            self.mesh_renderer.set_submesh_texture(0, texture);
        }

        self.mesh = Some(mesh);
        Ok(())
    }

    /// Model matrix: recenter, scale to unit radius, spin around Y.
    fn model_matrix(&self) -> glam::Mat4 {
        let center = self.cpu_mesh.center();
        let radius = self.cpu_mesh.bounding_radius();
        rotation(self.angle, Vec3::Y) * scaling(1.0 / radius) * translation(-center)
    }
}

/// Faint ground quad under the model, drawn with the immediate-mode path.
fn ground_vertices() -> [Vertex; 6] {
    const Y: f32 = -1.2;
    const R: f32 = 2.5;
    const NEAR: [f32; 4] = [0.16, 0.17, 0.20, 1.0];
    const FAR: [f32; 4] = [0.09, 0.10, 0.12, 1.0];

    let a = Vertex::new([-R, Y, -R], FAR);
    let b = Vertex::new([R, Y, -R], FAR);
    let c = Vertex::new([R, Y, R], NEAR);
    let d = Vertex::new([-R, Y, R], NEAR);
    [a, b, c, a, c, d]
}

impl App for ViewerApp {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => return AppControl::Exit,
                    Key::Named(NamedKey::Space) => self.spinning = !self.spinning,
                    _ => {}
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }

            WindowEvent::CursorLeft { .. } => {
                self.dragging = false;
                self.cursor = None;
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x, position.y);
                if let (true, Some((px, py))) = (self.dragging, self.cursor) {
                    let dx = (x - px) as f32;
                    let dy = (y - py) as f32;
                    self.camera.orbit(-dx * ORBIT_SPEED, dy * ORBIT_SPEED);
                }
                self.cursor = Some((x, y));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                // Scale the step by distance so zoom feels uniform.
                self.camera.zoom(-lines * 0.1 * self.camera.radius());
            }

            _ => {}
        }

        AppControl::Continue
    }

    fn on_resize(&mut self, _window_id: WindowId, size: winit::dpi::PhysicalSize<u32>) {
        if size.height > 0 {
            self.camera.set_aspect(size.width as f32 / size.height as f32);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Err(e) = self.ensure_gpu_mesh(ctx) {
            log::error!("failed to prepare GPU resources: {e:#}");
            return AppControl::Exit;
        }

        if self.spinning {
            self.angle += ctx.time.dt * SPIN_SPEED;
        }

        let light_direction = Vec3::new(-0.4, -1.0, -0.3);
        let light_color = [1.0, 0.97, 0.9, 1.0];

        let mesh_uniforms = build_uniforms(
            &self.camera,
            self.model_matrix(),
            light_direction,
            light_color,
            ctx.time,
        );
        let ground_uniforms = Uniforms {
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            ..mesh_uniforms
        };

        let ground = ground_vertices();
        let clear = wgpu::Color {
            r: 0.013,
            g: 0.015,
            b: 0.022,
            a: 1.0,
        };

        // Split borrows so the draw closure and the frame context can
        // coexist.
        let Self {
            mesh,
            mesh_renderer,
            primitive_renderer,
            ..
        } = self;
        let Some(mesh) = mesh.as_ref() else {
            return AppControl::Continue;
        };

        ctx.render(clear, |rctx, target| {
            // Ground first (no depth), model on top.
            primitive_renderer.render(rctx, target, &ground, ground_uniforms);
            mesh_renderer.render(rctx, target, mesh, mesh_uniforms);
        })
    }
}
