//! TreeMesh - implicit octree engine over a [`TreeGrid`].
//!
//! Leaves are the state. Every refinement operation splits leaves top-down,
//! then restores balance around the leaves it created. [`TreeMesh::finalize`]
//! fixes a Morton (Z-order) cell order that all introspection follows.

use std::collections::HashSet;

use glam::DVec3;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info};

use super::refinement::{apply_subdivide, enforce_balance};
use super::{DAabb3, OctreeLeaves, OctreeNode, RefinementStats, TreeGrid};
use crate::engine::TreeEngine;
use crate::error::TreeError;

/// Triangle envelope stored in the surface R-tree.
struct TriangleBox {
  index: usize,
  env: AABB<[f64; 3]>,
}

impl RTreeObject for TriangleBox {
  type Envelope = AABB<[f64; 3]>;

  #[inline]
  fn envelope(&self) -> Self::Envelope {
    self.env
  }
}

/// Implicit octree mesh.
#[derive(Clone, Debug)]
pub struct TreeMesh {
  grid: TreeGrid,
  leaves: OctreeLeaves,
  /// Canonical cell order, set by `finalize`.
  ordered: Option<Vec<OctreeNode>>,
  stats: RefinementStats,
}

impl TreeMesh {
  /// Create an unrefined tree: one leaf per root block.
  pub fn new(grid: TreeGrid) -> Self {
    let leaves = OctreeLeaves::from_grid(&grid);
    Self {
      grid,
      leaves,
      ordered: None,
      stats: RefinementStats::default(),
    }
  }

  /// Rebuild a finalized tree from cell centre indices and levels.
  ///
  /// Centre indices are in half base cells: a cell with minimum corner `c`
  /// spanning `n` base cells has centre index `2 * c + n`.
  pub fn from_state(grid: TreeGrid, centers: &[[i64; 3]], levels: &[u32]) -> Result<Self, TreeError> {
    if centers.len() != levels.len() {
      return Err(TreeError::LengthMismatch {
        expected: centers.len(),
        found: levels.len(),
      });
    }

    let mut leaves = HashSet::with_capacity(centers.len());
    let mut volume: u128 = 0;

    for (center, &level) in centers.iter().zip(levels) {
      if level < grid.root_level || level > grid.max_level {
        return Err(TreeError::InvalidLevel {
          level: level as i64,
          max_level: grid.max_level,
        });
      }
      let span = grid.span(level) as i64;
      let mut coords = [0i32; 3];
      for axis in 0..3 {
        let corner = center[axis] - span;
        if corner.rem_euclid(2 * span) != 0 {
          return Err(TreeError::InvalidState(format!(
            "cell centre {center:?} is not aligned to level {level}"
          )));
        }
        coords[axis] = (corner / (2 * span)) as i32;
      }
      let node = OctreeNode::new(coords[0], coords[1], coords[2], level);
      if !grid.contains(&node) {
        return Err(TreeError::InvalidState(format!(
          "cell centre {center:?} lies outside the grid"
        )));
      }
      if !leaves.insert(node) {
        return Err(TreeError::InvalidState(format!("duplicate cell centre {center:?}")));
      }
      volume += (span as u128).pow(3);
    }

    // No leaf may sit inside another; with equal volume the leaves then tile.
    for node in &leaves {
      let mut ancestor = *node;
      while let Some(parent) = ancestor.get_parent(grid.root_level) {
        if leaves.contains(&parent) {
          return Err(TreeError::InvalidState(format!(
            "cell {node:?} overlaps cell {parent:?}"
          )));
        }
        ancestor = parent;
      }
    }
    let expected: u128 = grid.shape.iter().map(|&n| n as u128).product();
    if volume != expected {
      return Err(TreeError::InvalidState(format!(
        "cells cover {volume} of {expected} base cells"
      )));
    }

    let mut tree = Self {
      grid,
      leaves: OctreeLeaves::from(leaves),
      ordered: None,
      stats: RefinementStats::default(),
    };
    tree.finalize()?;
    Ok(tree)
  }

  /// Base grid of the tree.
  pub fn grid(&self) -> &TreeGrid {
    &self.grid
  }

  /// Leaves, in no particular order.
  pub fn leaves(&self) -> &OctreeLeaves {
    &self.leaves
  }

  /// Counters accumulated over all operations.
  pub fn stats(&self) -> RefinementStats {
    self.stats
  }

  /// Leaf containing a world position, if inside the grid.
  pub fn leaf_at(&self, point: DVec3) -> Option<OctreeNode> {
    let probe = self.grid.node_containing(point, self.grid.max_level)?;
    self.leaves.covering_leaf(&probe, self.grid.root_level)
  }

  fn ensure_mutable(&self) -> Result<(), TreeError> {
    if self.ordered.is_some() {
      return Err(TreeError::Finalized);
    }
    Ok(())
  }

  fn ordered(&self) -> Result<&[OctreeNode], TreeError> {
    self.ordered.as_deref().ok_or(TreeError::NotFinalized)
  }

  fn check_level(&self, level: i64) -> Result<u32, TreeError> {
    if level < 0 || level > self.grid.max_level as i64 {
      return Err(TreeError::InvalidLevel {
        level,
        max_level: self.grid.max_level,
      });
    }
    Ok(level as u32)
  }

  /// Split leaves coarser than `level` while `overlaps` holds for their box.
  ///
  /// Returns the leaves created.
  fn split_where<F>(&mut self, level: u32, overlaps: F) -> Vec<OctreeNode>
  where
    F: Fn(&DAabb3) -> bool,
  {
    let mut stack: Vec<OctreeNode> = self
      .leaves
      .iter()
      .filter(|node| node.level < level)
      .copied()
      .collect();
    let mut created = Vec::new();

    while let Some(node) = stack.pop() {
      if !overlaps(&self.grid.node_bounds(&node)) {
        continue;
      }
      let children = apply_subdivide(&node, &mut self.leaves, self.grid.max_level);
      if children.is_empty() {
        continue;
      }
      self.stats.subdivisions_performed += 1;
      for child in children {
        if child.level < level {
          stack.push(child);
        }
        created.push(child);
      }
    }
    created
  }

  /// Balance around `created`, then finalize on request.
  fn complete(
    &mut self,
    created: Vec<OctreeNode>,
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    let balanced = enforce_balance(&mut self.leaves, &self.grid, created, diagonal_balance);
    self.stats.balance_subdivisions_performed += balanced;
    if finalize {
      self.finalize()?;
    }
    Ok(())
  }
}

impl TreeEngine for TreeMesh {
  fn max_level(&self) -> u32 {
    self.grid.max_level
  }

  fn origin(&self) -> DVec3 {
    self.grid.origin
  }

  fn base_cell_size(&self) -> DVec3 {
    self.grid.cell_size
  }

  fn shape(&self) -> [u32; 3] {
    self.grid.shape
  }

  fn n_cells(&self) -> usize {
    self.leaves.len()
  }

  fn is_finalized(&self) -> bool {
    self.ordered.is_some()
  }

  #[tracing::instrument(skip_all, name = "tree::refine")]
  fn refine(&mut self, level: u32, diagonal_balance: bool, finalize: bool) -> Result<(), TreeError> {
    self.ensure_mutable()?;
    let level = self.check_level(level as i64)?;
    let created = self.split_where(level, |_| true);
    debug!(level, created = created.len(), "uniform refinement");
    self.complete(created, diagonal_balance, finalize)
  }

  #[tracing::instrument(skip_all, name = "tree::refine_ball")]
  fn refine_ball(
    &mut self,
    centers: &[DVec3],
    radius: f64,
    level: u32,
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    self.ensure_mutable()?;
    let level = self.check_level(level as i64)?;
    if !radius.is_finite() || radius < 0.0 {
      return Err(TreeError::InvalidState(format!("ball radius {radius} must be non-negative")));
    }

    // A zero radius reaches no cell.
    if radius == 0.0 {
      return self.complete(Vec::new(), diagonal_balance, finalize);
    }

    let index: RTree<[f64; 3]> = RTree::bulk_load(centers.iter().map(|c| c.to_array()).collect());
    let radius_sq = radius * radius;
    let created = self.split_where(level, |bounds| {
      index
        .locate_in_envelope_intersecting(&bounds.expanded(radius).envelope())
        .any(|p| bounds.distance_squared_to_point(DVec3::from_array(*p)) <= radius_sq)
    });
    debug!(level, radius, created = created.len(), "ball refinement");
    self.complete(created, diagonal_balance, finalize)
  }

  #[tracing::instrument(skip_all, name = "tree::refine_surface")]
  fn refine_surface(
    &mut self,
    vertices: &[DVec3],
    triangles: &[[usize; 3]],
    level: i32,
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    self.ensure_mutable()?;
    let requested = if level < 0 {
      self.grid.max_level as i64 + 1 + level as i64
    } else {
      level as i64
    };
    let level = self.check_level(requested)?;

    if let Some(bad) = triangles.iter().flatten().find(|&&i| i >= vertices.len()) {
      return Err(TreeError::InvalidState(format!(
        "triangle vertex {bad} out of range for {} vertices",
        vertices.len()
      )));
    }

    let boxes: Vec<TriangleBox> = triangles
      .iter()
      .enumerate()
      .filter_map(|(index, tri)| {
        let bounds = DAabb3::from_points(&tri.map(|i| vertices[i]))?;
        Some(TriangleBox {
          index,
          env: bounds.envelope(),
        })
      })
      .collect();
    let index = RTree::bulk_load(boxes);

    let created = self.split_where(level, |bounds| {
      index
        .locate_in_envelope_intersecting(&bounds.envelope())
        .any(|tri| {
          let [a, b, c] = triangles[tri.index];
          bounds.intersects_triangle(vertices[a], vertices[b], vertices[c])
        })
    });
    debug!(level, created = created.len(), "surface refinement");
    self.complete(created, diagonal_balance, finalize)
  }

  #[tracing::instrument(skip_all, name = "tree::insert_cells")]
  fn insert_cells(
    &mut self,
    points: &[DVec3],
    levels: &[u32],
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    self.ensure_mutable()?;
    if points.len() != levels.len() {
      return Err(TreeError::LengthMismatch {
        expected: points.len(),
        found: levels.len(),
      });
    }

    let mut created = Vec::new();
    let mut outside = 0;
    for (point, &level) in points.iter().zip(levels) {
      let level = self.check_level(level as i64)?;
      let Some(probe) = self.grid.node_containing(*point, self.grid.max_level) else {
        outside += 1;
        continue;
      };
      let Some(mut leaf) = self.leaves.covering_leaf(&probe, self.grid.root_level) else {
        continue;
      };
      while leaf.level < level {
        let children = apply_subdivide(&leaf, &mut self.leaves, self.grid.max_level);
        self.stats.subdivisions_performed += 1;
        created.extend(children);
        leaf = probe.ancestor_at(leaf.level + 1);
      }
    }

    if outside > 0 {
      debug!(outside, "points outside the grid skipped");
    }
    self.stats.points_outside += outside;
    self.complete(created, diagonal_balance, finalize)
  }

  fn finalize(&mut self) -> Result<(), TreeError> {
    self.ensure_mutable()?;
    let max_level = self.grid.max_level;
    let mut ordered: Vec<OctreeNode> = self.leaves.iter().copied().collect();
    ordered.sort_unstable_by_key(|node| node.morton_key(max_level));

    info!(
      n_cells = ordered.len(),
      finest_level = ?self.leaves.finest_level(),
      subdivisions = self.stats.total_subdivisions(),
      balance_subdivisions = self.stats.balance_subdivisions_performed,
      "tree finalized"
    );
    self.ordered = Some(ordered);
    Ok(())
  }

  fn cell_centers(&self) -> Result<Vec<DVec3>, TreeError> {
    Ok(self.ordered()?.iter().map(|node| self.grid.node_center(node)).collect())
  }

  fn cell_levels(&self) -> Result<Vec<u32>, TreeError> {
    Ok(self.ordered()?.iter().map(|node| node.level).collect())
  }

  fn ubc_index_array(&self) -> Result<(Vec<[u32; 3]>, Vec<u32>), TreeError> {
    let nz = self.grid.shape[2] as i32;
    let mut indices = Vec::with_capacity(self.leaves.len());
    let mut widths = Vec::with_capacity(self.leaves.len());

    for node in self.ordered()? {
      let span = self.grid.span(node.level);
      let (i, j, kz) = (node.x * span, node.y * span, node.z * span);
      let k = nz - kz - span;
      indices.push([(i + 1) as u32, (j + 1) as u32, (k + 1) as u32]);
      widths.push(span as u32);
    }
    Ok((indices, widths))
  }

  fn ubc_order(&self) -> Result<Vec<usize>, TreeError> {
    let (indices, _) = self.ubc_index_array()?;
    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by_key(|&row| {
      let [i, j, k] = indices[row];
      (k, j, i)
    });
    Ok(order)
  }
}

#[cfg(test)]
#[path = "tree_mesh_test.rs"]
mod tree_mesh_test;
