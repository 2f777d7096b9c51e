//! Mesh loading and GPU upload.
//!
//! `obj` parses Wavefront OBJ text into a [`CpuMesh`]; [`GpuMesh`] uploads
//! the result into vertex/index buffers with per-submesh draw ranges.

mod gpu;
mod obj;

use std::ops::Range;

use crate::render::shader_types::MeshVertex;

pub use gpu::{GpuMesh, GpuSubmesh};
pub use obj::{parse_obj, ObjError};

/// A contiguous index range drawn with one material slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Submesh {
    pub name: String,
    pub range: Range<u32>,
}

/// Host-side mesh: interleaved vertices, `u32` indices, submesh ranges.
#[derive(Debug, Clone, Default)]
pub struct CpuMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<Submesh>,
}

impl CpuMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Centroid of the vertex positions. Origin for an empty mesh.
    pub fn center(&self) -> glam::Vec3 {
        if self.vertices.is_empty() {
            return glam::Vec3::ZERO;
        }
        let sum: glam::Vec3 = self
            .vertices
            .iter()
            .map(|v| glam::Vec3::from_slice(&v.position[..3]))
            .sum();
        sum / self.vertices.len() as f32
    }

    /// Radius of the bounding sphere around [`center`](Self::center).
    ///
    /// Returns a small positive value for empty/degenerate meshes so callers
    /// can divide by it when framing a camera.
    pub fn bounding_radius(&self) -> f32 {
        let center = self.center();
        self.vertices
            .iter()
            .map(|v| (glam::Vec3::from_slice(&v.position[..3]) - center).length())
            .fold(0.0f32, f32::max)
            .max(1e-4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shader_types::MeshVertex;

    fn vert(p: [f32; 3]) -> MeshVertex {
        MeshVertex {
            position: [p[0], p[1], p[2], 1.0],
            ..Default::default()
        }
    }

    #[test]
    fn center_of_symmetric_points() {
        let mesh = CpuMesh {
            vertices: vec![vert([-1.0, 0.0, 0.0]), vert([1.0, 0.0, 0.0])],
            ..Default::default()
        };
        assert_eq!(mesh.center(), glam::Vec3::ZERO);
    }

    #[test]
    fn bounding_radius_of_unit_points() {
        let mesh = CpuMesh {
            vertices: vec![
                vert([1.0, 0.0, 0.0]),
                vert([-1.0, 0.0, 0.0]),
                vert([0.0, 1.0, 0.0]),
            ],
            ..Default::default()
        };
        assert!((mesh.bounding_radius() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_mesh_has_positive_radius() {
        let mesh = CpuMesh::default();
        assert!(mesh.bounding_radius() > 0.0);
    }
}
