use std::collections::HashMap;

use crate::mesh::GpuMesh;
use crate::render::shader_types::{BufferSlot, MeshVertex, Uniforms};
use crate::render::{RenderCtx, RenderTarget};
use crate::texture::Texture;

use super::common::{
    depth_state, uniform_bind_group_layout, uniform_binding, DepthTexture,
};

/// Renders uploaded meshes with depth testing and per-submesh textures.
///
/// GPU resources are created lazily on first use and recreated when the
/// surface format changes. The uniform buffer is written once per call, so
/// call `render` once per frame per mesh.
///
/// Submesh textures live here rather than on the mesh: wgpu bind groups are
/// built against this pipeline's layout, which the mesh has no access to.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    uniform_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,

    ubo: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,

    // Fallback for untextured submeshes.
    white: Option<Texture>,
    white_bind_group: Option<wgpu::BindGroup>,

    // Keyed by submesh index, like the original per-submesh texture table.
    textures: HashMap<usize, Texture>,
    texture_bind_groups: HashMap<usize, wgpu::BindGroup>,

    depth: Option<DepthTexture>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `texture` to the submesh at `submesh` index.
    ///
    /// Takes effect on the next `render` call. An out-of-range index is
    /// harmless; it simply never matches a submesh.
    pub fn set_submesh_texture(&mut self, submesh: usize, texture: Texture) {
        self.textures.insert(submesh, texture);
        self.texture_bind_groups.remove(&submesh);
    }

    /// Renders every submesh of `mesh` into `target`.
    ///
    /// The color attachment is loaded (draw over whatever the clear pass
    /// left); the depth attachment is cleared here.
    ///
    /// All submeshes share one uniform buffer per draw, so
    /// `uniforms.texture_size` is overwritten with the size of the
    /// lowest-indexed textured submesh (1x1 when none is textured).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mesh: &GpuMesh,
        uniforms: Uniforms,
    ) {
        if !ctx.viewport.is_valid() || mesh.index_count() == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        self.ensure_depth(ctx);
        self.ensure_texture_bind_groups(ctx);

        // texture_size reflects the lowest-indexed textured submesh;
        // untextured meshes report the 1x1 fallback.
        let mut uniforms = uniforms;
        uniforms.texture_size = self.bound_texture_size();

        let Some(ubo) = self.ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(uniform_bg) = self.uniform_bind_group.as_ref() else { return };
        let Some(white_bg) = self.white_bind_group.as_ref() else { return };
        let Some(depth) = self.depth.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kiln mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, uniform_bg, &[]);
        rpass.set_vertex_buffer(BufferSlot::Vertices.index(), mesh.vertex_buffer().slice(..));
        rpass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);

        for (i, submesh) in mesh.submeshes().iter().enumerate() {
            let bg = self.texture_bind_groups.get(&i).unwrap_or(white_bg);
            rpass.set_bind_group(1, bg, &[]);
            rpass.draw_indexed(submesh.range.clone(), 0, 0..1);
        }
    }

    fn bound_texture_size(&self) -> [f32; 4] {
        let size = self
            .textures
            .iter()
            .min_by_key(|(i, _)| **i)
            .map(|(_, t)| t.size())
            .unwrap_or((1, 1));
        [size.0 as f32, size.1 as f32, 0.0, 0.0]
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader_src = include_str!("shaders/mesh.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kiln mesh shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let uniform_layout = uniform_bind_group_layout(ctx.device, "kiln mesh uniforms bgl");

        let texture_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("kiln mesh texture bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("kiln mesh pipeline layout"),
                    bind_group_layouts: &[&uniform_layout, &texture_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kiln mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.uniform_layout = Some(uniform_layout);
        self.texture_layout = Some(texture_layout);

        // Layout changed; everything built against it must be rebuilt.
        self.ubo = None;
        self.uniform_bind_group = None;
        self.white_bind_group = None;
        self.texture_bind_groups.clear();
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.ubo.is_some() && self.uniform_bind_group.is_some() {
            return;
        }
        let Some(layout) = self.uniform_layout.as_ref() else { return };

        let (ubo, bind_group) = uniform_binding(ctx, layout, "kiln mesh uniforms");
        self.ubo = Some(ubo);
        self.uniform_bind_group = Some(bind_group);
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        let matches = self
            .depth
            .as_ref()
            .is_some_and(|d| d.matches(ctx.viewport));
        if matches {
            return;
        }
        self.depth = Some(DepthTexture::new(ctx.device, ctx.viewport, "kiln mesh depth"));
    }

    fn ensure_texture_bind_groups(&mut self, ctx: &RenderCtx<'_>) {
        let Some(layout) = self.texture_layout.as_ref() else { return };

        if self.white.is_none() {
            self.white = Some(Texture::white(ctx.device, ctx.queue));
        }
        // white is set just above
        let Some(white) = self.white.as_ref() else { return };

        if self.white_bind_group.is_none() {
            self.white_bind_group = Some(texture_bind_group(
                ctx.device,
                layout,
                white,
                "kiln mesh white bg",
            ));
        }

        for (i, texture) in &self.textures {
            if !self.texture_bind_groups.contains_key(i) {
                self.texture_bind_groups.insert(
                    *i,
                    texture_bind_group(ctx.device, layout, texture, "kiln mesh texture bg"),
                );
            }
        }
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(texture.view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(texture.sampler()),
            },
        ],
    })
}
