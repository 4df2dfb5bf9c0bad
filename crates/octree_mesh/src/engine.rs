//! Tree engine contract used by refinement strategies and the codec.
//!
//! The engine owns the adaptive cell structure: splitting, balance and the
//! canonical ordering fixed by [`TreeEngine::finalize`]. Strategies only ever
//! talk to it through this trait, so any engine (or a recording mock) can
//! drive the same pipeline.
//!
//! Levels grow finer up to `max_level` (a single base cell). A cell at level
//! `l` spans `2^(max_level - l)` base cells per axis; grids with unequal
//! power-of-two counts start at a root level above 0. Every refinement call
//! takes:
//!
//! - `diagonal_balance`: balance across edges and corners, not only faces
//! - `finalize`: finalize the tree once the call completes

use glam::DVec3;

use crate::error::TreeError;

/// Adaptive tree mesh engine.
pub trait TreeEngine {
  /// Finest level of the tree.
  fn max_level(&self) -> u32;

  /// Minimum corner of the domain.
  fn origin(&self) -> DVec3;

  /// Base (finest) cell size per axis.
  fn base_cell_size(&self) -> DVec3;

  /// Base cell count per axis.
  fn shape(&self) -> [u32; 3];

  /// Current number of leaf cells.
  fn n_cells(&self) -> usize;

  fn is_finalized(&self) -> bool;

  /// Split every cell coarser than `level`.
  fn refine(&mut self, level: u32, diagonal_balance: bool, finalize: bool) -> Result<(), TreeError>;

  /// Split cells within `radius` of any centre down to `level`.
  ///
  /// A zero radius splits nothing.
  fn refine_ball(
    &mut self,
    centers: &[DVec3],
    radius: f64,
    level: u32,
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError>;

  /// Split cells intersecting any triangle down to `level`.
  ///
  /// Negative levels count back from the finest: `-1` is `max_level`.
  fn refine_surface(
    &mut self,
    vertices: &[DVec3],
    triangles: &[[usize; 3]],
    level: i32,
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError>;

  /// Ensure the cell containing each point is at least at its level.
  fn insert_cells(
    &mut self,
    points: &[DVec3],
    levels: &[u32],
    diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError>;

  /// Fix the canonical cell order. No mutation is allowed afterwards.
  fn finalize(&mut self) -> Result<(), TreeError>;

  /// Cell centres in canonical order.
  fn cell_centers(&self) -> Result<Vec<DVec3>, TreeError>;

  /// Cell levels in canonical order.
  fn cell_levels(&self) -> Result<Vec<u32>, TreeError>;

  /// One-based UBC corner indices (top-down vertical) and cell widths in
  /// base cells, in canonical order.
  fn ubc_index_array(&self) -> Result<(Vec<[u32; 3]>, Vec<u32>), TreeError>;

  /// Permutation from canonical order to UBC order (sorted by K, then J,
  /// then I).
  fn ubc_order(&self) -> Result<Vec<usize>, TreeError>;
}
