use crate::render::shader_types::{BufferSlot, Uniforms, Vertex};
use crate::render::{RenderCtx, RenderTarget};

use super::common::{uniform_bind_group_layout, uniform_binding};

/// Immediate-mode triangle renderer.
///
/// The caller supplies a fresh `&[Vertex]` slice every frame; the renderer
/// uploads it into a growable vertex buffer and draws non-indexed triangles.
/// This is the "push a pointer and a length at a slot" path of the host API,
/// so there is no retained geometry here.
///
/// The pipeline has no depth attachment; primitives draw over whatever the
/// frame already contains.
#[derive(Default)]
pub struct PrimitiveRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    uniform_layout: Option<wgpu::BindGroupLayout>,
    ubo: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
}

impl PrimitiveRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `vertices` and draws them as a triangle list.
    ///
    /// `vertices.len()` should be a multiple of 3; a trailing partial
    /// triangle is dropped by the GPU. An empty slice draws nothing.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        vertices: &[Vertex],
        uniforms: Uniforms,
    ) {
        if vertices.is_empty() || !ctx.viewport.is_valid() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        self.ensure_vertex_capacity(ctx, vertices.len());

        let Some(ubo) = self.ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));

        let Some(vbo) = self.vbo.as_ref() else { return };
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(vertices));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.uniform_bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kiln primitive pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(BufferSlot::Vertices.index(), vbo.slice(..));
        rpass.draw(0..vertices.len() as u32, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader_src = include_str!("shaders/primitive.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kiln primitive shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let uniform_layout = uniform_bind_group_layout(ctx.device, "kiln primitive bgl");

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("kiln primitive pipeline layout"),
                    bind_group_layouts: &[&uniform_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kiln primitive pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.uniform_layout = Some(uniform_layout);

        self.ubo = None;
        self.uniform_bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.ubo.is_some() && self.uniform_bind_group.is_some() {
            return;
        }
        let Some(layout) = self.uniform_layout.as_ref() else { return };

        let (ubo, bind_group) = uniform_binding(ctx, layout, "kiln primitive uniforms");
        self.ubo = Some(ubo);
        self.uniform_bind_group = Some(bind_group);
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(96);
        let new_size = (new_cap * std::mem::size_of::<Vertex>()) as u64;

        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln primitive vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
    }
}
