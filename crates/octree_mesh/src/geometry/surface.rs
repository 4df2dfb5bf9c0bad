//! Triangulated surfaces and averaged vertex normals.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Triangulated surface entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
  pub name: String,
  pub vertices: Vec<DVec3>,
  /// Triangles as vertex index triples.
  #[serde(default)]
  pub cells: Vec<[usize; 3]>,
}

impl Surface {
  /// Whether every triangle indexes an existing vertex.
  pub fn indices_in_range(&self) -> bool {
    self.cells.iter().flatten().all(|&i| i < self.vertices.len())
  }
}

/// Per-vertex normal: the normalised sum of incident face normals.
///
/// Face normals are `(v1 - v0) x (v2 - v0)`, so larger triangles weigh more.
/// Vertices whose sum vanishes keep a zero normal.
pub fn vertex_normals(vertices: &[DVec3], triangles: &[[usize; 3]]) -> Vec<DVec3> {
  let mut normals = vec![DVec3::ZERO; vertices.len()];
  for &[a, b, c] in triangles {
    let face = (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]);
    normals[a] += face;
    normals[b] += face;
    normals[c] += face;
  }
  normals.iter().map(|n| n.normalize_or_zero()).collect()
}
