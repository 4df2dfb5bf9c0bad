//! Ball refinement around point locations.

use glam::DVec3;
use tracing::debug;

use super::{cell_size_from_level, LevelSchedule};
use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result};
use crate::geometry::Entity;

/// Refine balls around the locations of `entity`.
pub fn refine_tree_from_points<E: TreeEngine>(
  mesh: &mut E,
  entity: &Entity,
  schedule: &LevelSchedule,
  diagonal_balance: bool,
  finalize: bool,
) -> Result<()> {
  let locations = entity
    .locations()
    .ok_or_else(|| OctreeError::LocationsUnavailable(entity.name().to_string()))?;
  refine_tree_from_locations(mesh, entity.name(), &locations, schedule, diagonal_balance, finalize)
}

/// Refine balls of growing radius around `locations`.
///
/// The radius accumulates `count * cell_size(i)` over the schedule, so each
/// coarser level reaches past the previous one. Zero counts still issue a
/// call at the unchanged radius, so a leading zero refines nothing.
pub fn refine_tree_from_locations<E: TreeEngine>(
  mesh: &mut E,
  name: &str,
  locations: &[DVec3],
  schedule: &LevelSchedule,
  diagonal_balance: bool,
  finalize: bool,
) -> Result<()> {
  if locations.is_empty() {
    return Err(OctreeError::LocationsUnavailable(name.to_string()));
  }
  schedule.check_depth(mesh.max_level())?;

  let mut distance = 0.0;
  for (index, count) in schedule.iter() {
    distance += count as f64 * cell_size_from_level(mesh, index, 0);
    let level = mesh.max_level() - index as u32;
    debug!(name, level, distance, "ball refinement");
    mesh.refine_ball(locations, distance, level, diagonal_balance, false)?;
  }

  if finalize {
    mesh.finalize()?;
  }
  Ok(())
}
