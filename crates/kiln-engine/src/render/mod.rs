//! GPU rendering subsystem.
//!
//! Renderers issue GPU commands via wgpu against a [`RenderCtx`] (device,
//! queue, surface format, viewport) and a [`RenderTarget`] (encoder + color
//! view). Each renderer owns its own GPU resources (pipeline, buffers, bind
//! groups) and recreates them lazily when the surface format changes.
//!
//! Convention:
//! - geometry is in world space; the vertex shaders apply
//!   projection * view * model from the shared [`Uniforms`] block.
//! - `shader_types` is the layout contract between host and WGSL code.

mod ctx;
pub mod pipelines;
pub mod shader_types;

pub use ctx::{RenderCtx, RenderTarget, Viewport};
pub use shader_types::{BufferSlot, MeshVertex, Uniforms, Vertex};
