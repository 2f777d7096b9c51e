//! Wavefront OBJ parser.
//!
//! Line-oriented: each statement lives on one line, so errors carry a
//! 1-based line number. Supported statements: `v` (with optional vertex
//! color extension), `vn`, `vt`, `f` (any polygon, fan-triangulated,
//! negative and `v/vt/vn`-form indices), and `o`/`g`/`usemtl` as submesh
//! boundaries. `mtllib`, `s`, comments, and unknown keywords are ignored.
//!
//! Faces without normal references get area-weighted smooth normals after
//! parsing, so lighting always has input.

use std::collections::HashMap;

use glam::Vec3;
use thiserror::Error;

use crate::render::shader_types::MeshVertex;

use super::{CpuMesh, Submesh};

/// A parse error with the 1-based source line where it occurred.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("obj parse error at line {line}: {message}")]
pub struct ObjError {
    pub line: usize,
    pub message: String,
}

impl ObjError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parses OBJ source text into a [`CpuMesh`].
pub fn parse_obj(src: &str) -> Result<CpuMesh, ObjError> {
    Parser::new().run(src)
}

/// Key into the vertex dedup table: (position, texcoord, normal) indices.
type VertexKey = (usize, Option<usize>, Option<usize>);

struct Parser {
    positions: Vec<[f32; 3]>,
    colors: Vec<Option<[f32; 3]>>,
    normals: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,

    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
    dedup: HashMap<VertexKey, u32>,

    /// Emitted vertices that still need a generated normal.
    needs_normal: Vec<u32>,

    submeshes: Vec<Submesh>,
    submesh_name: String,
    submesh_start: u32,
}

impl Parser {
    fn new() -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            dedup: HashMap::new(),
            needs_normal: Vec::new(),
            submeshes: Vec::new(),
            submesh_name: "default".to_string(),
            submesh_start: 0,
        }
    }

    fn run(mut self, src: &str) -> Result<CpuMesh, ObjError> {
        for (i, raw) in src.lines().enumerate() {
            let line_no = i + 1;

            // Strip trailing comment, then surrounding whitespace.
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_ascii_whitespace();
            // split_ascii_whitespace on a non-empty line always yields a keyword
            let Some(keyword) = fields.next() else { continue };
            let rest: Vec<&str> = fields.collect();

            match keyword {
                "v" => self.parse_position(line_no, &rest)?,
                "vn" => self.parse_normal(line_no, &rest)?,
                "vt" => self.parse_texcoord(line_no, &rest)?,
                "f" => self.parse_face(line_no, &rest)?,
                "o" | "g" | "usemtl" => {
                    self.begin_submesh(rest.first().copied().unwrap_or("default"));
                }
                // Materials and smoothing groups are out of scope.
                "mtllib" | "s" => {}
                _ => {
                    log::trace!("obj line {line_no}: ignoring keyword {keyword:?}");
                }
            }
        }

        self.close_submesh();
        self.generate_missing_normals();

        Ok(CpuMesh {
            vertices: self.vertices,
            indices: self.indices,
            submeshes: self.submeshes,
        })
    }

    // ── statements ────────────────────────────────────────────────────────

    fn parse_position(&mut self, line: usize, fields: &[&str]) -> Result<(), ObjError> {
        if fields.len() < 3 {
            return Err(ObjError::new(line, "v needs at least 3 coordinates"));
        }
        let xyz = parse_f32s::<3>(line, &fields[..3])?;
        self.positions.push(xyz);

        // Vertex color extension: `v x y z r g b`.
        if fields.len() >= 6 {
            let rgb = parse_f32s::<3>(line, &fields[3..6])?;
            self.colors.push(Some(rgb));
        } else {
            self.colors.push(None);
        }
        Ok(())
    }

    fn parse_normal(&mut self, line: usize, fields: &[&str]) -> Result<(), ObjError> {
        if fields.len() < 3 {
            return Err(ObjError::new(line, "vn needs 3 components"));
        }
        self.normals.push(parse_f32s::<3>(line, &fields[..3])?);
        Ok(())
    }

    fn parse_texcoord(&mut self, line: usize, fields: &[&str]) -> Result<(), ObjError> {
        if fields.len() < 2 {
            return Err(ObjError::new(line, "vt needs at least 2 components"));
        }
        self.texcoords.push(parse_f32s::<2>(line, &fields[..2])?);
        Ok(())
    }

    fn parse_face(&mut self, line: usize, fields: &[&str]) -> Result<(), ObjError> {
        if fields.len() < 3 {
            return Err(ObjError::new(
                line,
                format!("face has {} vertices, need at least 3", fields.len()),
            ));
        }

        let mut corners = Vec::with_capacity(fields.len());
        for field in fields {
            corners.push(self.emit_vertex(line, field)?);
        }

        // Fan triangulation around the first corner.
        for i in 1..corners.len() - 1 {
            self.indices.push(corners[0]);
            self.indices.push(corners[i]);
            self.indices.push(corners[i + 1]);
        }
        Ok(())
    }

    // ── vertex emission ───────────────────────────────────────────────────

    /// Resolves one `v`, `v/vt`, `v//vn`, or `v/vt/vn` face corner to an
    /// index in the output vertex array, deduplicating exact repeats.
    fn emit_vertex(&mut self, line: usize, field: &str) -> Result<u32, ObjError> {
        let mut parts = field.split('/');

        // split always yields at least one element
        let Some(pos_part) = parts.next() else {
            return Err(ObjError::new(line, "empty face vertex"));
        };
        let pos = resolve_index(line, pos_part, self.positions.len(), "vertex")?;

        let vt = match parts.next() {
            None | Some("") => None,
            Some(p) => Some(resolve_index(line, p, self.texcoords.len(), "texcoord")?),
        };
        let vn = match parts.next() {
            None | Some("") => None,
            Some(p) => Some(resolve_index(line, p, self.normals.len(), "normal")?),
        };

        let key = (pos, vt, vn);
        if let Some(&index) = self.dedup.get(&key) {
            return Ok(index);
        }

        let p = self.positions[pos];
        let color = self.colors[pos].unwrap_or([1.0, 1.0, 1.0]);
        let uv = vt.map(|i| self.texcoords[i]).unwrap_or([0.0, 0.0]);

        let normal = match vn {
            Some(i) => self.normals[i],
            None => [0.0, 0.0, 0.0], // filled in by generate_missing_normals
        };

        let index = self.vertices.len() as u32;
        self.vertices.push(MeshVertex {
            position: [p[0], p[1], p[2], 1.0],
            normal: [normal[0], normal[1], normal[2], 0.0],
            color: [color[0], color[1], color[2], 1.0],
            // Flip V: OBJ uses a bottom-left texture origin, wgpu top-left.
            texcoord: [uv[0], 1.0 - uv[1], 0.0, 0.0],
        });
        if vn.is_none() {
            self.needs_normal.push(index);
        }
        self.dedup.insert(key, index);
        Ok(index)
    }

    // ── submeshes ─────────────────────────────────────────────────────────

    fn begin_submesh(&mut self, name: &str) {
        self.close_submesh();
        self.submesh_name = name.to_string();
        self.submesh_start = self.indices.len() as u32;
    }

    fn close_submesh(&mut self) {
        let end = self.indices.len() as u32;
        if end > self.submesh_start {
            self.submeshes.push(Submesh {
                name: std::mem::take(&mut self.submesh_name),
                range: self.submesh_start..end,
            });
        }
        self.submesh_start = end;
    }

    // ── normal generation ─────────────────────────────────────────────────

    /// Area-weighted smooth normals for vertices emitted without one.
    ///
    /// The unnormalized triangle cross product is proportional to the
    /// triangle's area, so summing it weights large faces more.
    fn generate_missing_normals(&mut self) {
        if self.needs_normal.is_empty() {
            return;
        }

        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from_slice(&self.vertices[a].position[..3]);
            let pb = Vec3::from_slice(&self.vertices[b].position[..3]);
            let pc = Vec3::from_slice(&self.vertices[c].position[..3]);

            let face = (pb - pa).cross(pc - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }

        for &i in &self.needs_normal {
            let n = accum[i as usize].normalize_or(Vec3::Z);
            self.vertices[i as usize].normal = [n.x, n.y, n.z, 0.0];
        }
    }
}

// ── field parsing ─────────────────────────────────────────────────────────

fn parse_f32s<const N: usize>(line: usize, fields: &[&str]) -> Result<[f32; N], ObjError> {
    let mut out = [0.0f32; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field
            .parse::<f32>()
            .map_err(|_| ObjError::new(line, format!("invalid number {field:?}")))?;
    }
    Ok(out)
}

/// Resolves a 1-based (or negative, relative-from-end) OBJ index into a
/// 0-based array index.
fn resolve_index(line: usize, field: &str, count: usize, what: &str) -> Result<usize, ObjError> {
    let raw = field
        .parse::<i64>()
        .map_err(|_| ObjError::new(line, format!("invalid {what} index {field:?}")))?;

    let resolved = if raw > 0 {
        raw as usize - 1
    } else if raw < 0 {
        let back = (-raw) as usize;
        if back > count {
            return Err(ObjError::new(
                line,
                format!("{what} index {raw} out of range (have {count})"),
            ));
        }
        count - back
    } else {
        return Err(ObjError::new(line, format!("{what} index must not be 0")));
    };

    if resolved >= count {
        return Err(ObjError::new(
            line,
            format!("{what} index {raw} out of range (have {count})"),
        ));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── happy path ────────────────────────────────────────────────────────

    #[test]
    fn parses_triangle_with_normals_and_uvs() {
        let mesh = parse_obj(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             vn 0 0 1\n\
             vt 0 0\n\
             vt 1 0\n\
             vt 0 1\n\
             f 1/1/1 2/2/1 3/3/1\n",
        )
        .unwrap();

        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0, 0.0]);
        // V is flipped to the top-left texture origin.
        assert_eq!(mesh.vertices[1].texcoord, [1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             f 1 2 3 4\n",
        )
        .unwrap();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             f 1 2 3\nf 1 3 4\n",
        )
        .unwrap();

        // 6 corners, 4 unique vertices.
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn negative_indices_resolve_from_end() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f -3 -2 -1\n",
        )
        .unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn vertex_colors_are_parsed() {
        let mesh = parse_obj(
            "v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 0 1 0 0 0 1\n\
             f 1 2 3\n",
        )
        .unwrap();
        assert_eq!(mesh.vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[2].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn comments_and_unknown_keywords_are_ignored() {
        let mesh = parse_obj(
            "# a comment\n\
             mtllib scene.mtl\n\
             s off\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0 # trailing comment\n\
             f 1 2 3\n",
        )
        .unwrap();
        assert_eq!(mesh.vertices.len(), 3);
    }

    // ── submeshes ─────────────────────────────────────────────────────────

    #[test]
    fn usemtl_splits_submeshes() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n\
             usemtl stone\n\
             f 1 2 3\n\
             usemtl wood\n\
             f 2 4 3\n",
        )
        .unwrap();

        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.submeshes[0].name, "stone");
        assert_eq!(mesh.submeshes[0].range, 0..3);
        assert_eq!(mesh.submeshes[1].name, "wood");
        assert_eq!(mesh.submeshes[1].range, 3..6);
    }

    #[test]
    fn faces_before_any_marker_get_default_submesh() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.submeshes.len(), 1);
        assert_eq!(mesh.submeshes[0].name, "default");
        assert_eq!(mesh.submeshes[0].range, 0..3);
    }

    #[test]
    fn empty_submesh_markers_produce_no_submesh() {
        let mesh = parse_obj(
            "o empty\n\
             o full\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        assert_eq!(mesh.submeshes.len(), 1);
        assert_eq!(mesh.submeshes[0].name, "full");
    }

    // ── normal generation ─────────────────────────────────────────────────

    #[test]
    fn missing_normals_are_generated() {
        // CCW triangle in the XY plane; its normal is +Z.
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        for v in &mesh.vertices {
            assert!((v.normal[2] - 1.0).abs() < 1e-6, "normal {:?}", v.normal);
            assert_eq!(v.normal[3], 0.0);
        }
    }

    #[test]
    fn explicit_normals_are_not_overwritten() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vn 1 0 0\n\
             f 1//1 2//1 3//1\n",
        )
        .unwrap();
        assert_eq!(mesh.vertices[0].normal, [1.0, 0.0, 0.0, 0.0]);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn error_carries_line_number() {
        let err = parse_obj("v 0 0 0\nv nope 0 0\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("invalid number"));
    }

    #[test]
    fn face_index_out_of_range() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("out of range"));
    }

    #[test]
    fn negative_face_index_past_start_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -4 -2 -1\n").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("out of range"));
    }

    #[test]
    fn face_index_zero_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(err.message.contains("must not be 0"));
    }

    #[test]
    fn face_with_two_vertices_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn short_position_is_rejected() {
        let err = parse_obj("v 1 2\n").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
