//! Concrete render pipelines.
//!
//! `MeshRenderer` draws uploaded [`crate::mesh::GpuMesh`] geometry with
//! depth testing and per-submesh textures. `PrimitiveRenderer` is the
//! immediate-mode path: the caller supplies a vertex slice every frame.

mod common;
mod mesh;
mod primitive;

pub use common::DEPTH_FORMAT;
pub use mesh::MeshRenderer;
pub use primitive::PrimitiveRenderer;
