use super::*;
use crate::octree::refinement::is_balanced;

fn grid(shape: [u32; 3], h: f64) -> TreeGrid {
  TreeGrid::new(DVec3::ZERO, DVec3::splat(h), shape).unwrap()
}

fn volume(tree: &TreeMesh) -> i64 {
  tree
    .leaves()
    .iter()
    .map(|n| (tree.grid().span(n.level) as i64).pow(3))
    .sum()
}

/// Centre indices (half base cells) of a finalized tree.
fn centre_indices(tree: &TreeMesh) -> (Vec<[i64; 3]>, Vec<u32>) {
  let grid = tree.grid();
  let levels = tree.cell_levels().unwrap();
  let centers = tree
    .cell_centers()
    .unwrap()
    .iter()
    .map(|c| {
      let local = (*c - grid.origin) / grid.cell_size * 2.0;
      [local.x.round() as i64, local.y.round() as i64, local.z.round() as i64]
    })
    .collect();
  (centers, levels)
}

// =========================================================================
// Lifecycle Tests
// =========================================================================

/// A new tree holds one leaf per root block and refuses introspection.
#[test]
fn test_new_tree_is_unfinalized() {
  let tree = TreeMesh::new(grid([16, 4, 8], 10.0));

  assert_eq!(tree.n_cells(), 8);
  assert!(!tree.is_finalized());
  assert_eq!(tree.cell_centers(), Err(TreeError::NotFinalized));
  assert_eq!(tree.ubc_order(), Err(TreeError::NotFinalized));
}

/// Mutation after finalize fails, including a second finalize.
#[test]
fn test_finalized_tree_rejects_mutation() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  tree.refine(2, false, true).unwrap();

  assert!(tree.is_finalized());
  assert_eq!(tree.refine(3, false, false), Err(TreeError::Finalized));
  assert_eq!(
    tree.insert_cells(&[DVec3::ONE], &[3], false, false),
    Err(TreeError::Finalized)
  );
  assert_eq!(tree.finalize(), Err(TreeError::Finalized));
}

/// Levels beyond the finest are rejected.
#[test]
fn test_invalid_level_rejected() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  assert!(matches!(tree.refine(4, false, false), Err(TreeError::InvalidLevel { .. })));
  assert!(matches!(
    tree.refine_surface(&[DVec3::ZERO; 3], &[[0, 1, 2]], -5, false, false),
    Err(TreeError::InvalidLevel { .. })
  ));
}

// =========================================================================
// Refinement Tests
// =========================================================================

/// Uniform refinement reaches every cell.
#[test]
fn test_refine_uniform() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  tree.refine(2, false, false).unwrap();
  assert_eq!(tree.n_cells(), 64);

  tree.refine(3, false, false).unwrap();
  assert_eq!(tree.n_cells(), 512);
}

/// Ball refinement reaches the finest level at the centre and stays balanced.
#[test]
fn test_refine_ball() {
  let mut tree = TreeMesh::new(grid([32, 32, 32], 1.0));
  let center = DVec3::new(10.3, 20.7, 5.1);
  tree.refine_ball(&[center], 2.0, 5, false, false).unwrap();

  assert_eq!(tree.leaf_at(center).map(|n| n.level), Some(5));
  assert!(tree.leaf_at(DVec3::new(31.0, 1.0, 31.0)).unwrap().level <= 2);
  assert!(is_balanced(tree.leaves(), tree.grid(), false));
  assert_eq!(volume(&tree), 32 * 32 * 32);
}

/// Empty ball centre list is a no-op.
#[test]
fn test_refine_ball_without_centres() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  tree.refine_ball(&[], 5.0, 3, false, false).unwrap();
  assert_eq!(tree.n_cells(), 1);
}

/// A zero radius splits nothing, even for a centre inside a cell.
#[test]
fn test_refine_ball_zero_radius() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  tree.refine_ball(&[DVec3::splat(4.3)], 0.0, 3, false, true).unwrap();
  assert_eq!(tree.n_cells(), 1);
  assert!(tree.is_finalized());
}

/// A horizontal triangle refines the slab it crosses at the finest level.
#[test]
fn test_refine_surface_relative_level() {
  let mut tree = TreeMesh::new(grid([16, 16, 16], 1.0));
  let vertices = [
    DVec3::new(0.0, 0.0, 8.5),
    DVec3::new(16.0, 0.0, 8.5),
    DVec3::new(0.0, 16.0, 8.5),
  ];
  tree.refine_surface(&vertices, &[[0, 1, 2]], -1, true, false).unwrap();

  assert_eq!(tree.leaf_at(DVec3::new(2.0, 2.0, 8.5)).map(|n| n.level), Some(4));
  assert!(tree.leaf_at(DVec3::new(14.0, 14.0, 8.5)).unwrap().level < 4);
  assert!(tree.leaf_at(DVec3::new(2.0, 2.0, 1.0)).unwrap().level < 4);
  assert!(is_balanced(tree.leaves(), tree.grid(), true));
}

/// Triangles must index existing vertices.
#[test]
fn test_refine_surface_rejects_bad_index() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  let result = tree.refine_surface(&[DVec3::ZERO; 3], &[[0, 1, 3]], 2, false, false);
  assert!(matches!(result, Err(TreeError::InvalidState(_))));
}

/// Inserting one finest cell in a 16x4x8 grid gives 22 cells.
#[test]
fn test_insert_cells_non_cubic() {
  let mut tree = TreeMesh::new(grid([16, 4, 8], 10.0));
  tree.insert_cells(&[DVec3::splat(10.0)], &[3], false, true).unwrap();

  assert_eq!(tree.n_cells(), 22);
  let (indices, widths) = tree.ubc_index_array().unwrap();
  let finest: Vec<[u32; 3]> = indices
    .iter()
    .zip(&widths)
    .filter(|(_, &w)| w == 1)
    .map(|(i, _)| *i)
    .collect();
  assert_eq!(finest.len(), 8);
  for [i, j, k] in finest {
    assert!((1..=2).contains(&i) && (1..=2).contains(&j), "I, J one-based {i} {j}");
    assert!((7..=8).contains(&k), "K one-based top-down {k}");
  }
}

/// Points outside the grid are skipped and counted.
#[test]
fn test_insert_cells_outside_domain() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  tree
    .insert_cells(&[DVec3::splat(-1.0), DVec3::splat(20.0)], &[3, 3], false, false)
    .unwrap();

  assert_eq!(tree.n_cells(), 1);
  assert_eq!(tree.stats().points_outside, 2);
  assert!(matches!(
    tree.insert_cells(&[DVec3::ONE], &[], false, false),
    Err(TreeError::LengthMismatch { .. })
  ));
}

// =========================================================================
// Ordering and Rebuild Tests
// =========================================================================

/// UBC order sorts rows by K, then J, then I.
#[test]
fn test_ubc_order_is_sorted() {
  let mut tree = TreeMesh::new(grid([8, 8, 8], 1.0));
  tree.insert_cells(&[DVec3::splat(0.5)], &[3], false, true).unwrap();

  let (indices, _) = tree.ubc_index_array().unwrap();
  let order = tree.ubc_order().unwrap();
  let keys: Vec<(u32, u32, u32)> = order
    .iter()
    .map(|&row| (indices[row][2], indices[row][1], indices[row][0]))
    .collect();
  assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

/// Rebuilding from centre indices reproduces the leaves.
#[test]
fn test_from_state_roundtrip() {
  let mut tree = TreeMesh::new(grid([16, 4, 8], 2.0));
  tree
    .insert_cells(&[DVec3::new(3.0, 3.0, 3.0), DVec3::new(30.0, 7.0, 15.0)], &[3, 2], false, true)
    .unwrap();

  let (centers, levels) = centre_indices(&tree);
  let rebuilt = TreeMesh::from_state(tree.grid().clone(), &centers, &levels).unwrap();

  assert!(rebuilt.is_finalized());
  assert_eq!(rebuilt.cell_centers().unwrap(), tree.cell_centers().unwrap());
  assert_eq!(rebuilt.cell_levels().unwrap(), tree.cell_levels().unwrap());
}

/// Overlapping cells and gaps are rejected.
#[test]
fn test_from_state_rejects_invalid_tiling() {
  let g = grid([2, 2, 2], 1.0);

  // Root cell plus one of its children
  let overlap = TreeMesh::from_state(g.clone(), &[[2, 2, 2], [1, 1, 1]], &[0, 1]);
  assert!(matches!(overlap, Err(TreeError::InvalidState(_))));

  // Single child only
  let gap = TreeMesh::from_state(g.clone(), &[[1, 1, 1]], &[1]);
  assert!(matches!(gap, Err(TreeError::InvalidState(_))));

  // Misaligned centre
  let misaligned = TreeMesh::from_state(g, &[[2, 2, 2]], &[1]);
  assert!(matches!(misaligned, Err(TreeError::InvalidState(_))));
}
