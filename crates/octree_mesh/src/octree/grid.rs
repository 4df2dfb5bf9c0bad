//! TreeGrid - base grid geometry and world coordinate mapping.
//!
//! The grid is a block of `shape[axis]` base cells per axis (each a power of
//! two), starting at `origin` (minimum corner on every axis, so the vertical
//! axis is bottom-up).
//!
//! ```text
//! ls          = log2(shape)                   (per axis)
//! max_level   = ls            if all axes share it
//!             = min(ls) + 1   otherwise
//! root_level  = max_level - min(ls)
//! span(level) = 2^(max_level - level)         (base cells per axis)
//! ```
//!
//! Non-cubic grids are covered by several root blocks at level 1 and have no
//! level 0.

use glam::DVec3;

use super::{DAabb3, OctreeNode};
use crate::error::TreeError;

/// Base grid of a tree mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeGrid {
  /// Minimum corner of the grid.
  pub origin: DVec3,
  /// Base (finest) cell size per axis.
  pub cell_size: DVec3,
  /// Base cell count per axis.
  pub shape: [u32; 3],
  /// Finest level.
  pub max_level: u32,
  /// Level of the root blocks tiling the grid.
  pub root_level: u32,
}

impl TreeGrid {
  /// Build a grid, validating counts and sizes.
  pub fn new(origin: DVec3, cell_size: DVec3, shape: [u32; 3]) -> Result<Self, TreeError> {
    if shape.iter().any(|&n| n == 0 || !n.is_power_of_two() || n > (1 << 20)) {
      return Err(TreeError::InvalidShape(shape));
    }
    if cell_size.to_array().iter().any(|h| !h.is_finite() || *h <= 0.0) {
      return Err(TreeError::InvalidCellSize(cell_size.to_array()));
    }
    let ls = shape.map(|n| n.trailing_zeros());
    let min_ls = ls.iter().copied().min().unwrap_or(0);
    let max_level = if ls.iter().all(|&l| l == ls[0]) {
      ls[0]
    } else {
      min_ls + 1
    };

    Ok(Self {
      origin,
      cell_size,
      shape,
      max_level,
      root_level: max_level - min_ls,
    })
  }

  /// Base cells spanned by a cell at `level` along each axis.
  #[inline]
  pub fn span(&self, level: u32) -> i32 {
    1i32 << (self.max_level - level)
  }

  /// Physical cell size at `level`.
  #[inline]
  pub fn cell_size_at(&self, level: u32) -> DVec3 {
    self.cell_size * self.span(level) as f64
  }

  /// Number of cells along each axis at `level` (at least the root level).
  #[inline]
  pub fn cells_at(&self, level: u32) -> [i32; 3] {
    let span = self.span(level);
    self.shape.map(|n| n as i32 / span)
  }

  /// Total physical extent along each axis.
  #[inline]
  pub fn extent(&self) -> DVec3 {
    self.cell_size * DVec3::new(self.shape[0] as f64, self.shape[1] as f64, self.shape[2] as f64)
  }

  /// Whether a node lies within the grid at a valid level.
  #[inline]
  pub fn contains(&self, node: &OctreeNode) -> bool {
    if node.level < self.root_level || node.level > self.max_level {
      return false;
    }
    let [nx, ny, nz] = self.cells_at(node.level);
    (0..nx).contains(&node.x) && (0..ny).contains(&node.y) && (0..nz).contains(&node.z)
  }

  /// Root blocks tiling the grid.
  pub fn root_nodes(&self) -> Vec<OctreeNode> {
    let [nx, ny, nz] = self.cells_at(self.root_level);
    let mut roots = Vec::with_capacity((nx * ny * nz) as usize);
    for z in 0..nz {
      for y in 0..ny {
        for x in 0..nx {
          roots.push(OctreeNode::new(x, y, z, self.root_level));
        }
      }
    }
    roots
  }

  /// Get world-space minimum corner of a node.
  #[inline]
  pub fn node_min(&self, node: &OctreeNode) -> DVec3 {
    let size = self.cell_size_at(node.level);
    self.origin + DVec3::new(node.x as f64, node.y as f64, node.z as f64) * size
  }

  /// Get world-space center of a node.
  #[inline]
  pub fn node_center(&self, node: &OctreeNode) -> DVec3 {
    self.node_min(node) + self.cell_size_at(node.level) * 0.5
  }

  /// World-space bounds of a node.
  #[inline]
  pub fn node_bounds(&self, node: &OctreeNode) -> DAabb3 {
    let min = self.node_min(node);
    DAabb3::new(min, min + self.cell_size_at(node.level))
  }

  /// Base-cell index containing a world position, or None outside the grid.
  ///
  /// Positions on the upper boundary belong to the last cell.
  pub fn base_index(&self, point: DVec3) -> Option<[i32; 3]> {
    let local = (point - self.origin) / self.cell_size;
    let mut index = [0i32; 3];
    for axis in 0..3 {
      let n = self.shape[axis] as f64;
      let t = local[axis];
      if !(0.0..=n).contains(&t) {
        return None;
      }
      index[axis] = (t.floor() as i32).min(self.shape[axis] as i32 - 1);
    }
    Some(index)
  }

  /// Node at `level` containing a world position.
  pub fn node_containing(&self, point: DVec3, level: u32) -> Option<OctreeNode> {
    let [x, y, z] = self.base_index(point)?;
    Some(OctreeNode::new(x, y, z, self.max_level).ancestor_at(level))
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
