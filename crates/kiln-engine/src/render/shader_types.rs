//! Data layouts shared between host code and the WGSL shaders.
//!
//! Every struct here is mirrored by a WGSL declaration in
//! `pipelines/shaders/`. Field order, alignment, and byte size must match
//! exactly on both sides: a mismatch does not fail validation, it silently
//! feeds the shader garbage. The layouts are locked down by the tests at the
//! bottom of this file; change both sides together or not at all.

use bytemuck::{Pod, Zeroable};

// ── buffer slots ──────────────────────────────────────────────────────────

/// Stable buffer-slot integers shared with the shaders.
///
/// `Vertices` is a vertex-buffer slot; `Uniforms` is `@group(0) @binding(1)`
/// in WGSL. Host-side bind calls derive their index from this enum rather
/// than hardcoding the number twice.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferSlot {
    Vertices = 0,
    Uniforms = 1,
}

impl BufferSlot {
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

// ── uniforms ──────────────────────────────────────────────────────────────

/// Per-draw uniform block.
///
/// Matrices are column-major, matching both glam and WGSL `mat4x4<f32>`.
/// The vec4 tail packs scalars to keep every field 16-byte aligned:
/// - `light_direction`: xyz = world-space direction the light travels, w unused
/// - `light_color`: rgb = light color, a = intensity scale
/// - `time`: x = seconds since start, y = frame dt, zw unused
/// - `texture_size`: xy = bound texture size in texels, zw unused
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub time: [f32; 4],
    pub texture_size: [f32; 4],
}

impl Default for Uniforms {
    fn default() -> Self {
        let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            light_direction: [0.0, -1.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 1.0],
            time: [0.0; 4],
            texture_size: [1.0, 1.0, 0.0, 0.0],
        }
    }
}

impl Uniforms {
    /// Minimum uniform-buffer binding size for pipeline creation.
    ///
    /// `Uniforms` is non-empty by construction, so this never fails.
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<Self>() as u64)
            .expect("Uniforms has non-zero size")
    }
}

// ── immediate-mode vertex ─────────────────────────────────────────────────

/// Vertex for the immediate-mode primitive path: position + color, both
/// 4-component. 32 bytes, no padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x4, // position
        1 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    /// Convenience constructor from a 3D point and an RGBA color.
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            color,
        }
    }
}

// ── mesh vertex ───────────────────────────────────────────────────────────

/// Vertex for loaded meshes: position, normal, color, texcoord.
///
/// Everything is vec4-padded so the stride (64 bytes) stays friendly to
/// every backend's alignment rules. `texcoord` uses xy; zw are unused.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub color: [f32; 4],
    pub texcoord: [f32; 4],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x4, // position
        1 => Float32x4, // normal
        2 => Float32x4, // color
        3 => Float32x4  // texcoord
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl Default for MeshVertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0, 1.0],
            normal: [0.0, 0.0, 1.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
            texcoord: [0.0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    // ── layout lockdown ───────────────────────────────────────────────────

    #[test]
    fn uniforms_is_256_bytes() {
        assert_eq!(size_of::<Uniforms>(), 256);
    }

    #[test]
    fn uniforms_field_offsets_match_wgsl() {
        // Mirrors the WGSL struct Uniforms in mesh.wgsl / primitive.wgsl.
        assert_eq!(offset_of!(Uniforms, model), 0);
        assert_eq!(offset_of!(Uniforms, view), 64);
        assert_eq!(offset_of!(Uniforms, projection), 128);
        assert_eq!(offset_of!(Uniforms, light_direction), 192);
        assert_eq!(offset_of!(Uniforms, light_color), 208);
        assert_eq!(offset_of!(Uniforms, time), 224);
        assert_eq!(offset_of!(Uniforms, texture_size), 240);
    }

    #[test]
    fn uniforms_has_no_implicit_padding() {
        // Sum of field sizes equals the struct size.
        let fields = 3 * 64 + 4 * 16;
        assert_eq!(size_of::<Uniforms>(), fields);
    }

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(offset_of!(Vertex, position), 0);
        assert_eq!(offset_of!(Vertex, color), 16);
    }

    #[test]
    fn mesh_vertex_is_64_bytes() {
        assert_eq!(size_of::<MeshVertex>(), 64);
        assert_eq!(offset_of!(MeshVertex, position), 0);
        assert_eq!(offset_of!(MeshVertex, normal), 16);
        assert_eq!(offset_of!(MeshVertex, color), 32);
        assert_eq!(offset_of!(MeshVertex, texcoord), 48);
    }

    #[test]
    fn vertex_attribute_offsets_match_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 16);
    }

    #[test]
    fn mesh_vertex_attribute_offsets_match_struct() {
        let layout = MeshVertex::layout();
        assert_eq!(layout.array_stride, 64);
        for (i, attr) in layout.attributes.iter().enumerate() {
            assert_eq!(attr.offset, i as u64 * 16);
            assert_eq!(attr.shader_location, i as u32);
        }
    }

    // ── buffer slots ──────────────────────────────────────────────────────

    #[test]
    fn buffer_slots_are_stable() {
        // Renumbering slots breaks every compiled shader; pin them.
        assert_eq!(BufferSlot::Vertices.index(), 0);
        assert_eq!(BufferSlot::Uniforms.index(), 1);
    }

    // ── pod round trip ────────────────────────────────────────────────────

    #[test]
    fn uniforms_bytes_round_trip() {
        let mut u = Uniforms::default();
        u.time = [1.5, 0.016, 0.0, 0.0];
        u.texture_size = [512.0, 256.0, 0.0, 0.0];

        let bytes = bytemuck::bytes_of(&u);
        assert_eq!(bytes.len(), 256);

        let back: &Uniforms = bytemuck::from_bytes(bytes);
        assert_eq!(back.time, u.time);
        assert_eq!(back.texture_size, u.texture_size);
    }

    #[test]
    fn vertex_slice_casts_to_bytes() {
        let verts = [
            Vertex::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 64);
    }
}
