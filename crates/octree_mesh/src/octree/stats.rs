//! Counters collected while refining a tree.

/// Statistics from refinement execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefinementStats {
  /// Number of subdivisions requested by refinement operations.
  pub subdivisions_performed: usize,
  /// Number of subdivisions forced by level balance.
  pub balance_subdivisions_performed: usize,
  /// Points skipped by `insert_cells` because they fall outside the grid.
  pub points_outside: usize,
}

impl RefinementStats {
  /// Total subdivisions including balance enforcement.
  #[inline]
  pub fn total_subdivisions(&self) -> usize {
    self.subdivisions_performed + self.balance_subdivisions_performed
  }
}
