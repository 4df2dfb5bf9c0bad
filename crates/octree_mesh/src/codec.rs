//! Conversion between a tree engine and the flat octree cell table.
//!
//! The table stores one row `(I, J, K, NCells)` per leaf in UBC order: zero
//! based corner indices in base cells, the vertical index counted top-down,
//! and the cell width in base cells. The header stores the top corner of the
//! domain and a negative vertical cell size recording that flip.
//!
//! ```text
//! engine (bottom corner, +w)          table (top corner, -w)
//!   z ^                                 K = 0  +------+
//!     |  +------+                              |      |
//!     |  |      |                              +------+
//!     +--+------+--> x                  K = w_count
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result, TreeError};
use crate::octree::{TreeGrid, TreeMesh};

/// One leaf row of an octree cell table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OctreeCell {
  #[serde(rename = "I")]
  pub i: u32,
  #[serde(rename = "J")]
  pub j: u32,
  #[serde(rename = "K")]
  pub k: u32,
  #[serde(rename = "NCells")]
  pub n_cells: u32,
}

/// Persisted octree mesh: header plus UBC-ordered cell table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OctreeMesh {
  pub name: String,
  /// Domain corner; the top corner when `w_cell_size` is negative.
  pub origin: DVec3,
  pub u_count: u32,
  pub v_count: u32,
  pub w_count: u32,
  pub u_cell_size: f64,
  pub v_cell_size: f64,
  pub w_cell_size: f64,
  #[serde(default)]
  pub octree_cells: Vec<OctreeCell>,
}

impl OctreeMesh {
  pub fn n_cells(&self) -> usize {
    self.octree_cells.len()
  }

  /// Signed base cell sizes.
  pub fn cell_size(&self) -> DVec3 {
    DVec3::new(self.u_cell_size, self.v_cell_size, self.w_cell_size)
  }

  pub fn counts(&self) -> [u32; 3] {
    [self.u_count, self.v_count, self.w_count]
  }

  /// Cell centres in table order.
  ///
  /// Signed sizes make the vertical offset run downward from a top origin.
  pub fn centroids(&self) -> Vec<DVec3> {
    let size = self.cell_size();
    self
      .octree_cells
      .iter()
      .map(|cell| {
        let half = cell.n_cells as f64 / 2.0;
        let index = DVec3::new(cell.i as f64 + half, cell.j as f64 + half, cell.k as f64 + half);
        self.origin + index * size
      })
      .collect()
  }
}

/// Encode a finalized engine into an octree cell table.
pub fn treemesh_2_octree<E: TreeEngine>(mesh: &E, name: &str) -> Result<OctreeMesh> {
  let size = mesh.base_cell_size();
  if size.to_array().iter().any(|h| *h < 0.0) {
    return Err(OctreeError::NotImplemented(format!(
      "encoding a tree with negative base cell size {size:?}"
    )));
  }

  let (indices, widths) = mesh.ubc_index_array()?;
  let order = mesh.ubc_order()?;
  let octree_cells = order
    .iter()
    .map(|&row| {
      let [i, j, k] = indices[row];
      OctreeCell {
        i: i - 1,
        j: j - 1,
        k: k - 1,
        n_cells: widths[row],
      }
    })
    .collect::<Vec<_>>();

  let [u_count, v_count, w_count] = mesh.shape();
  let mut origin = mesh.origin();
  origin.z += w_count as f64 * size.z;

  debug!(name, n_cells = octree_cells.len(), "encoded octree");
  Ok(OctreeMesh {
    name: name.to_string(),
    origin,
    u_count,
    v_count,
    w_count,
    u_cell_size: size.x,
    v_cell_size: size.y,
    w_cell_size: -size.z,
    octree_cells,
  })
}

/// Decode an octree cell table into a finalized [`TreeMesh`].
///
/// Only the vertical axis may be inverted (negative size); it is flipped back
/// to the bottom-up convention of the engine.
pub fn octree_2_treemesh(octree: &OctreeMesh) -> Result<TreeMesh> {
  if octree.u_cell_size < 0.0 || octree.v_cell_size < 0.0 {
    return Err(OctreeError::NotImplemented(format!(
      "decoding '{}' with inverted horizontal cell size",
      octree.name
    )));
  }

  let signed = octree.cell_size();
  let counts = octree.counts();
  let mut shift = DVec3::ZERO;
  for axis in 0..3 {
    if signed[axis] < 0.0 {
      shift[axis] = counts[axis] as f64 * signed[axis];
    }
  }
  let grid = TreeGrid::new(octree.origin + shift, signed.abs(), counts)?;
  let max_level = grid.max_level;
  let flip = octree.w_cell_size < 0.0;

  let mut centers = Vec::with_capacity(octree.n_cells());
  let mut levels = Vec::with_capacity(octree.n_cells());
  for cell in &octree.octree_cells {
    let n = cell.n_cells;
    if !n.is_power_of_two() {
      return Err(TreeError::InvalidState(format!("cell width {n} is not a power of two")).into());
    }
    let depth = n.trailing_zeros();
    if depth > max_level {
      return Err(TreeError::InvalidLevel {
        level: max_level as i64 - depth as i64,
        max_level,
      }
      .into());
    }

    let n = n as i64;
    let mut center = [2 * cell.i as i64 + n, 2 * cell.j as i64 + n, 2 * cell.k as i64 + n];
    if flip {
      center[2] = 2 * octree.w_count as i64 - center[2];
    }
    centers.push(center);
    levels.push(max_level - depth);
  }

  Ok(TreeMesh::from_state(grid, &centers, &levels)?)
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
