//! Shell refinement around a triangulated surface.

use tracing::debug;

use super::LevelSchedule;
use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result};
use crate::geometry::{vertex_normals, Entity};

/// Refine concentric shells around a surface.
///
/// Each repetition refines along the current shell at level `-(index + 1)`
/// (relative to the finest), then moves every vertex by
/// `-2 * normal * base_cell_size * 2^index`.
pub fn refine_tree_from_triangulation<E: TreeEngine>(
  mesh: &mut E,
  entity: &Entity,
  schedule: &LevelSchedule,
  diagonal_balance: bool,
  finalize: bool,
) -> Result<()> {
  let surface = match entity {
    Entity::Surface(surface) if !surface.cells.is_empty() && surface.indices_in_range() => surface,
    _ => {
      return Err(OctreeError::InvalidGeometryType {
        name: entity.name().to_string(),
        expected: "surface",
      })
    }
  };
  schedule.check_depth(mesh.max_level())?;

  let normals = vertex_normals(&surface.vertices, &surface.cells);
  let base = mesh.base_cell_size();
  let mut vertices = surface.vertices.clone();

  for (index, count) in schedule.iter() {
    if count == 0 {
      continue;
    }
    let step = base * 2.0 * 2f64.powi(index as i32);
    let level = -(index as i32 + 1);
    debug!(entity = entity.name(), level, count, "surface shell");

    for _ in 0..count {
      mesh.refine_surface(&vertices, &surface.cells, level, diagonal_balance, false)?;
      for (vertex, normal) in vertices.iter_mut().zip(&normals) {
        *vertex -= *normal * step;
      }
    }
  }

  if finalize {
    mesh.finalize()?;
  }
  Ok(())
}
