//! Merging octree meshes and aligning them on a common grid.

use glam::DVec3;
use rstar::RTree;
use tracing::{debug, info, warn};

use crate::codec::OctreeMesh;
use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result, TreeError};
use crate::octree::{DAabb3, TreeGrid, TreeMesh};

/// Geometry of a mesh in a common frame: positive sizes and dimensions, with
/// the origin on the bottom corner of every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeAttributes {
  pub cell_count: [u32; 3],
  pub cell_size: DVec3,
  pub dimensions: DVec3,
  pub origin: DVec3,
  pub extent: DAabb3,
}

impl OctreeAttributes {
  fn new(cell_count: [u32; 3], cell_size: DVec3, origin: DVec3) -> Self {
    let dimensions = cell_size * DVec3::new(cell_count[0] as f64, cell_count[1] as f64, cell_count[2] as f64);
    Self {
      cell_count,
      cell_size,
      dimensions,
      origin,
      extent: DAabb3::new(origin, origin + dimensions),
    }
  }
}

/// A mesh that can take part in a merge.
pub trait OctreeSource {
  fn octree_attributes(&self) -> OctreeAttributes;

  /// Leaf centres with their levels re-expressed in a tree of `max_level`.
  fn leaf_cells(&self, max_level: u32) -> Result<(Vec<DVec3>, Vec<u32>)>;
}

impl OctreeSource for TreeMesh {
  fn octree_attributes(&self) -> OctreeAttributes {
    OctreeAttributes::new(self.shape(), self.base_cell_size(), self.origin())
  }

  fn leaf_cells(&self, max_level: u32) -> Result<(Vec<DVec3>, Vec<u32>)> {
    let centers = self.cell_centers()?;
    let levels = self
      .cell_levels()?
      .into_iter()
      .map(|level| shift_level(max_level as i64 - self.max_level() as i64 + level as i64, max_level))
      .collect::<Result<Vec<_>>>()?;
    Ok((centers, levels))
  }
}

impl OctreeSource for OctreeMesh {
  fn octree_attributes(&self) -> OctreeAttributes {
    let size = self.cell_size();
    let counts = self.counts();
    let mut origin = self.origin;
    for axis in 0..3 {
      if size[axis] < 0.0 {
        origin[axis] += counts[axis] as f64 * size[axis];
      }
    }
    OctreeAttributes::new(counts, size.abs(), origin)
  }

  fn leaf_cells(&self, max_level: u32) -> Result<(Vec<DVec3>, Vec<u32>)> {
    let levels = self
      .octree_cells
      .iter()
      .map(|cell| {
        if !cell.n_cells.is_power_of_two() {
          return Err(OctreeError::from(TreeError::InvalidState(format!(
            "NCells {} of mesh '{}' is not a power of two",
            cell.n_cells, self.name
          ))));
        }
        shift_level(max_level as i64 - cell.n_cells.trailing_zeros() as i64, max_level)
      })
      .collect::<Result<Vec<_>>>()?;
    Ok((self.centroids(), levels))
  }
}

fn shift_level(level: i64, max_level: u32) -> Result<u32> {
  if level < 0 || level > max_level as i64 {
    return Err(TreeError::InvalidLevel { level, max_level }.into());
  }
  Ok(level as u32)
}

/// Attributes of a mesh in the common bottom-corner frame.
pub fn get_octree_attributes<M: OctreeSource + ?Sized>(mesh: &M) -> OctreeAttributes {
  mesh.octree_attributes()
}

/// `np.allclose` tolerance: `|a - b| <= 1e-8 + 1e-5 * |b|` on every axis.
fn allclose(a: DVec3, b: DVec3) -> bool {
  let diff = (a - b).abs();
  let tolerance = DVec3::splat(1e-8) + b.abs() * 1e-5;
  diff.cmple(tolerance).all()
}

/// Build one tree resolving every input at least as finely as the input does.
///
/// All inputs must share dimensions and origin. The merged base cell size is
/// the per-axis minimum, and each axis holds the next power of two cells
/// covering the dimensions.
#[tracing::instrument(skip_all, name = "create_octree_from_octrees")]
pub fn create_octree_from_octrees(meshes: &[&dyn OctreeSource]) -> Result<TreeMesh> {
  let (first, rest) = meshes
    .split_first()
    .ok_or_else(|| OctreeError::MissingCells("no meshes to merge".into()))?;

  let reference = first.octree_attributes();
  let mut cell_size = reference.cell_size;
  for mesh in rest {
    let attributes = mesh.octree_attributes();
    if !allclose(reference.dimensions, attributes.dimensions) {
      return Err(OctreeError::DimensionMismatch);
    }
    if !allclose(reference.origin, attributes.origin) {
      return Err(OctreeError::OriginMismatch);
    }
    cell_size = cell_size.min(attributes.cell_size);
  }

  let mut shape = [0u32; 3];
  for axis in 0..3 {
    let exponent = (reference.dimensions[axis] / cell_size[axis]).log2().ceil().max(0.0) as u32;
    let n = 1u32.checked_shl(exponent).ok_or(TreeError::InvalidShape(shape))?;
    shape[axis] = n;
  }
  let grid = TreeGrid::new(reference.origin, cell_size, shape)?;
  let max_level = grid.max_level;
  info!(?shape, max_level, inputs = meshes.len(), "merged grid");

  let mut merged = TreeMesh::new(grid);
  for mesh in meshes {
    let (centers, levels) = mesh.leaf_cells(max_level)?;
    if centers.is_empty() {
      continue;
    }
    merged.insert_cells(&centers, &levels, false, false)?;
  }
  merged.finalize()?;
  debug!(cells = merged.n_cells(), "merged tree");
  Ok(merged)
}

/// Move each local mesh origin onto the nearest cell corner of `global`.
///
/// Corners are `(I * u, J * v, K * w) + origin` in the table frame. Returns
/// the shift applied to each local mesh.
#[tracing::instrument(skip_all, name = "collocate_octrees")]
pub fn collocate_octrees(global: &OctreeMesh, locals: &mut [OctreeMesh]) -> Result<Vec<DVec3>> {
  if global.octree_cells.is_empty() {
    return Err(OctreeError::MissingCells(global.name.clone()));
  }
  let size = global.cell_size();
  let corners: Vec<[f64; 3]> = global
    .octree_cells
    .iter()
    .map(|cell| {
      let index = DVec3::new(cell.i as f64, cell.j as f64, cell.k as f64);
      (index * size + global.origin).to_array()
    })
    .collect();
  let index = RTree::bulk_load(corners);

  let mut shifts = Vec::with_capacity(locals.len());
  for local in locals.iter_mut() {
    if local.cell_size().abs() != size.abs() {
      return Err(OctreeError::CellSizeMismatch(local.name.clone()));
    }
    let nearest = index
      .nearest_neighbor(&local.origin.to_array())
      .map(|corner| DVec3::from_array(*corner))
      .ok_or_else(|| OctreeError::MissingCells(global.name.clone()))?;

    let shift = nearest - local.origin;
    if shift != DVec3::ZERO {
      warn!(
        mesh = %local.name,
        shift = %shift,
        "shifting mesh origin to match the global mesh"
      );
      local.origin = nearest;
    }
    shifts.push(shift);
  }
  Ok(shifts)
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;
