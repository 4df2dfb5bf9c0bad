//! Ball refinement along a densified polyline.

use super::{refine_tree_from_locations, LevelSchedule};
use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result};
use crate::geometry::{densify_curve, Entity};

/// Densify the curve at the finest horizontal cell size, then refine balls
/// around the samples.
pub fn refine_tree_from_curve<E: TreeEngine>(
  mesh: &mut E,
  entity: &Entity,
  schedule: &LevelSchedule,
  diagonal_balance: bool,
  finalize: bool,
) -> Result<()> {
  let curve = match entity {
    Entity::Curve(curve) if !curve.cells.is_empty() && curve.indices_in_range() => curve,
    _ => {
      return Err(OctreeError::InvalidGeometryType {
        name: entity.name().to_string(),
        expected: "curve",
      })
    }
  };

  let locations = densify_curve(curve, mesh.base_cell_size().x);
  refine_tree_from_locations(mesh, &curve.name, &locations, schedule, diagonal_balance, finalize)
}
