//! Shared GPU state used by the pipelines.

use crate::render::shader_types::{BufferSlot, Uniforms};
use crate::render::{RenderCtx, Viewport};

/// Depth buffer format used by all 3D pipelines.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── uniform buffer + bind group ───────────────────────────────────────────

/// Bind group layout for the shared uniform block at
/// `@group(0) @binding(BufferSlot::Uniforms)`.
pub(super) fn uniform_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: BufferSlot::Uniforms.index(),
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(Uniforms::min_binding_size()),
            },
            count: None,
        }],
    })
}

/// Creates the uniform buffer and its bind group against `layout`.
pub(super) fn uniform_binding(
    ctx: &RenderCtx<'_>,
    layout: &wgpu::BindGroupLayout,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<Uniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: BufferSlot::Uniforms.index(),
            resource: ubo.as_entire_binding(),
        }],
    });

    (ubo, bind_group)
}

// ── depth texture ─────────────────────────────────────────────────────────

/// Depth attachment owned by a renderer, recreated when the viewport changes.
pub(super) struct DepthTexture {
    pub view: wgpu::TextureView,
    size: Viewport,
}

impl DepthTexture {
    pub(super) fn new(device: &wgpu::Device, viewport: Viewport, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: viewport.width.max(1),
                height: viewport.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            size: viewport,
        }
    }

    pub(super) fn matches(&self, viewport: Viewport) -> bool {
        self.size == viewport
    }
}

/// Standard depth state: write + less-than compare.
pub(super) fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}
