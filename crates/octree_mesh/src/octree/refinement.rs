//! Split and balance primitives over implicit leaves.
//!
//! # Balance
//!
//! After any split, adjacent leaves may differ by at most one level. With
//! `diagonal` set the constraint covers all 26 neighbours (edges and
//! corners), otherwise only the 6 face neighbours. Violations are fixed by
//! splitting the coarser leaf; splits cascade through a work list seeded with
//! the leaves that were just created.

use smallvec::SmallVec;

use super::{OctreeLeaves, OctreeNode, TreeGrid};

/// Direction offsets for 6 face neighbors.
const FACE_OFFSETS: [(i32, i32, i32); 6] = [
  (-1, 0, 0), // -X
  (1, 0, 0),  // +X
  (0, -1, 0), // -Y
  (0, 1, 0),  // +Y
  (0, 0, -1), // -Z
  (0, 0, 1),  // +Z
];

/// All 26 face, edge and corner neighbour offsets.
fn diagonal_offsets() -> impl Iterator<Item = (i32, i32, i32)> {
  (-1..=1)
    .flat_map(|dz| (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| (dx, dy, dz))))
    .filter(|&offset| offset != (0, 0, 0))
}

/// Apply a subdivide operation: remove parent, add its 8 children.
///
/// Returns the children added, empty if the parent is not a leaf or is
/// already at `max_level`.
pub fn apply_subdivide(
  parent: &OctreeNode,
  leaves: &mut OctreeLeaves,
  max_level: u32,
) -> SmallVec<[OctreeNode; 8]> {
  if parent.level >= max_level || !leaves.contains(parent) {
    return SmallVec::new();
  }

  let children: SmallVec<[OctreeNode; 8]> = (0..8u8)
    .filter_map(|octant| parent.get_child(octant, max_level))
    .collect();

  leaves.remove(parent);
  for child in &children {
    leaves.insert(*child);
  }
  children
}

/// Find the neighbour leaf of `node` at `offset`, at the same or a coarser
/// level.
///
/// Returns None outside the grid or when the neighbour region holds finer
/// leaves.
fn find_neighbor(
  node: &OctreeNode,
  offset: (i32, i32, i32),
  leaves: &OctreeLeaves,
  grid: &TreeGrid,
) -> Option<OctreeNode> {
  let probe = node.offset(offset.0, offset.1, offset.2);
  if !grid.contains(&probe) {
    return None;
  }
  leaves.covering_leaf(&probe, grid.root_level)
}

/// Enforce 2:1 balance around `seeds`.
///
/// Returns the number of balance subdivisions performed.
pub fn enforce_balance(
  leaves: &mut OctreeLeaves,
  grid: &TreeGrid,
  seeds: Vec<OctreeNode>,
  diagonal: bool,
) -> usize {
  let offsets: SmallVec<[(i32, i32, i32); 26]> = if diagonal {
    diagonal_offsets().collect()
  } else {
    FACE_OFFSETS.iter().copied().collect()
  };

  let mut work = seeds;
  let mut subdivisions = 0;

  while let Some(node) = work.pop() {
    if !leaves.contains(&node) {
      continue;
    }
    for &offset in &offsets {
      // A single split may not be enough when the neighbour is several
      // levels coarser.
      while let Some(neighbor) = find_neighbor(&node, offset, leaves, grid) {
        if neighbor.level + 1 >= node.level {
          break;
        }
        let children = apply_subdivide(&neighbor, leaves, grid.max_level);
        if children.is_empty() {
          break;
        }
        subdivisions += 1;
        work.extend(children);
      }
    }
  }

  subdivisions
}

/// Check the balance constraint over every leaf.
pub fn is_balanced(leaves: &OctreeLeaves, grid: &TreeGrid, diagonal: bool) -> bool {
  let offsets: Vec<(i32, i32, i32)> = if diagonal {
    diagonal_offsets().collect()
  } else {
    FACE_OFFSETS.to_vec()
  };

  leaves.iter().all(|node| {
    offsets.iter().all(|&offset| {
      find_neighbor(node, offset, leaves, grid)
        .map_or(true, |neighbor| neighbor.level + 1 >= node.level)
    })
  })
}

#[cfg(test)]
#[path = "refinement_test.rs"]
mod refinement_test;
