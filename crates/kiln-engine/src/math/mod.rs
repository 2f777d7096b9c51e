//! Transform and camera math.
//!
//! Everything is glam-based, right-handed, column-major. Projection
//! matrices target wgpu's 0..1 clip-space depth.

mod camera;
mod transforms;

pub use camera::OrbitCamera;
pub use transforms::{build_uniforms, perspective, rotation, scaling, translation};
