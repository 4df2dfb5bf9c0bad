//! OctreeLeaves - implicit octree represented as a set of leaf nodes.
//!
//! The tree structure is implicit: parent/child relationships are computed
//! on-demand via coordinate math. Only leaves are stored.

use std::collections::HashSet;

use super::{OctreeNode, TreeGrid};

/// Implicit octree - leaves ARE the state.
///
/// No explicit tree structure. Parent/child relationships computed on demand.
#[derive(Clone, Debug, Default)]
pub struct OctreeLeaves {
  leaves: HashSet<OctreeNode>,
}

impl OctreeLeaves {
  /// Create empty leaves set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Initialize with the root blocks covering a grid.
  pub fn from_grid(grid: &TreeGrid) -> Self {
    Self {
      leaves: grid.root_nodes().into_iter().collect(),
    }
  }

  /// Number of leaves.
  pub fn len(&self) -> usize {
    self.leaves.len()
  }

  /// Check if empty.
  pub fn is_empty(&self) -> bool {
    self.leaves.is_empty()
  }

  /// Check if a node is a leaf.
  pub fn contains(&self, node: &OctreeNode) -> bool {
    self.leaves.contains(node)
  }

  /// Insert a leaf node.
  pub fn insert(&mut self, node: OctreeNode) -> bool {
    self.leaves.insert(node)
  }

  /// Remove a leaf node.
  pub fn remove(&mut self, node: &OctreeNode) -> bool {
    self.leaves.remove(node)
  }

  /// Iterate over leaves.
  pub fn iter(&self) -> impl Iterator<Item = &OctreeNode> {
    self.leaves.iter()
  }

  /// Leaf covering `probe`: the probe itself or its nearest leaf ancestor.
  ///
  /// `probe` must lie inside the grid. Returns None when the probe region is
  /// covered by finer leaves.
  pub fn covering_leaf(&self, probe: &OctreeNode, root_level: u32) -> Option<OctreeNode> {
    (root_level..=probe.level)
      .rev()
      .map(|level| probe.ancestor_at(level))
      .find(|node| self.leaves.contains(node))
  }

  /// Finest level present among the leaves.
  pub fn finest_level(&self) -> Option<u32> {
    self.leaves.iter().map(|n| n.level).max()
  }
}

impl From<HashSet<OctreeNode>> for OctreeLeaves {
  fn from(leaves: HashSet<OctreeNode>) -> Self {
    Self { leaves }
  }
}

#[cfg(test)]
#[path = "leaves_test.rs"]
mod leaves_test;
