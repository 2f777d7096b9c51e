use std::ops::Range;

use anyhow::Result;
use wgpu::util::DeviceExt;

use super::CpuMesh;

/// Submesh draw range as uploaded.
#[derive(Debug, Clone)]
pub struct GpuSubmesh {
    pub name: String,
    pub range: Range<u32>,
}

/// Device-side mesh: vertex/index buffers plus submesh draw ranges.
pub struct GpuMesh {
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    submeshes: Vec<GpuSubmesh>,
    index_count: u32,
}

impl GpuMesh {
    /// Uploads `mesh` into device buffers.
    ///
    /// A mesh with no submeshes gets a single implicit one spanning every
    /// index, so `render` always has a range to draw.
    pub fn upload(device: &wgpu::Device, mesh: &CpuMesh, label: &str) -> Result<Self> {
        anyhow::ensure!(!mesh.vertices.is_empty(), "mesh has no vertices");
        anyhow::ensure!(!mesh.indices.is_empty(), "mesh has no indices");
        anyhow::ensure!(
            mesh.indices.len() % 3 == 0,
            "index count {} is not a multiple of 3",
            mesh.indices.len()
        );

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let index_count = mesh.indices.len() as u32;

        let submeshes = if mesh.submeshes.is_empty() {
            vec![GpuSubmesh {
                name: "default".to_string(),
                range: 0..index_count,
            }]
        } else {
            mesh.submeshes
                .iter()
                .map(|s| GpuSubmesh {
                    name: s.name.clone(),
                    range: s.range.clone(),
                })
                .collect()
        };

        log::debug!(
            "uploaded mesh {label:?}: {} vertices, {} indices, {} submeshes",
            mesh.vertices.len(),
            index_count,
            submeshes.len()
        );

        Ok(Self {
            vertex_buf,
            index_buf,
            submeshes,
            index_count,
        })
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buf
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buf
    }

    pub fn submeshes(&self) -> &[GpuSubmesh] {
        &self.submeshes
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}
