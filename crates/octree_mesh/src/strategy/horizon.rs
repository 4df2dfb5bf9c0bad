//! Horizon refinement: sheets of cells stacked below an elevation surface.

use glam::{DVec2, DVec3};
use tracing::debug;

use super::{cell_size_from_level, LevelSchedule};
use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result};
use crate::geometry::{Entity, HorizonInterpolator};
use crate::octree::DAabb3;

/// Uniform samples `min, min + step, ...` strictly below `max`.
fn arange(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
  let count = ((max - min) / step).ceil().max(0.0) as usize;
  (0..count).map(move |k| min + k as f64 * step)
}

/// Insert sheets of cells below the surface interpolated from the entity's
/// locations.
///
/// For each non-zero schedule entry a horizontal grid at that level's cell
/// size covers the locations. Grid nodes inside the triangulation and closer
/// than `max_distance` to an original point receive `count` cells, each one
/// cell height deeper than the last. The depth keeps growing across entries.
pub fn refine_tree_from_surface<E: TreeEngine>(
  mesh: &mut E,
  entity: &Entity,
  schedule: &LevelSchedule,
  diagonal_balance: bool,
  max_distance: Option<f64>,
  finalize: bool,
) -> Result<()> {
  let locations = entity
    .locations()
    .ok_or_else(|| OctreeError::LocationsUnavailable(entity.name().to_string()))?;
  schedule.check_depth(mesh.max_level())?;

  let extent = DAabb3::from_points(&locations)
    .ok_or_else(|| OctreeError::LocationsUnavailable(entity.name().to_string()))?;
  let horizon = HorizonInterpolator::new(&locations);
  let max_distance = max_distance.unwrap_or(f64::INFINITY);

  let mut depth = 0.0;
  for (index, count) in schedule.iter() {
    if count == 0 {
      continue;
    }
    let dx = cell_size_from_level(mesh, index, 0);
    let dy = cell_size_from_level(mesh, index, 1);
    let dz = cell_size_from_level(mesh, index, 2);

    let mut nodes: Vec<(DVec2, f64)> = Vec::new();
    for y in arange(extent.min.y, extent.max.y, dy) {
      for x in arange(extent.min.x, extent.max.x, dx) {
        let xy = DVec2::new(x, y);
        if horizon.nearest_distance(xy) >= max_distance {
          continue;
        }
        if let Some(z) = horizon.interpolate(xy) {
          nodes.push((xy, z));
        }
      }
    }

    let level = mesh.max_level() - index as u32;
    debug!(entity = entity.name(), level, nodes = nodes.len(), "horizon sheet");
    for _ in 0..count {
      depth += dz;
      if nodes.is_empty() {
        continue;
      }
      let points: Vec<DVec3> = nodes.iter().map(|(xy, z)| xy.extend(z - depth)).collect();
      mesh.insert_cells(&points, &vec![level; points.len()], diagonal_balance, false)?;
    }
  }

  if finalize {
    mesh.finalize()?;
  }
  Ok(())
}
