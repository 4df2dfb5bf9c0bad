//! Base mesh construction from object vertices.

use glam::DVec3;

use super::{DAabb3, TreeGrid, TreeMesh};
use crate::error::TreeError;

/// Build an unrefined tree enclosing `vertices`.
///
/// Per axis the core spans the vertex extent, with the vertical minimum
/// lowered by `depth_core`. `padding[axis]` holds the (lower, upper) padding
/// distances. The cell count is the next power of two strictly above
/// `extent / cell_size` and the padded core sits centred in the grid.
pub fn mesh_builder_xyz(
  vertices: &[DVec3],
  cell_size: DVec3,
  padding: [[f64; 2]; 3],
  depth_core: f64,
) -> Result<TreeMesh, TreeError> {
  let bounds = DAabb3::from_points(vertices)
    .ok_or_else(|| TreeError::InvalidState("no vertices to build a mesh around".into()))?;
  if padding.iter().flatten().any(|p| !p.is_finite() || *p < 0.0) || depth_core < 0.0 {
    return Err(TreeError::InvalidState(format!(
      "padding {padding:?} and core depth {depth_core} must be non-negative"
    )));
  }
  if cell_size.to_array().iter().any(|h| !h.is_finite() || *h <= 0.0) {
    return Err(TreeError::InvalidCellSize(cell_size.to_array()));
  }

  let mut core_min = bounds.min;
  core_min.z -= depth_core;
  let core = bounds.max - core_min;

  let mut origin = DVec3::ZERO;
  let mut shape = [0u32; 3];
  for axis in 0..3 {
    let [pad_lo, pad_hi] = padding[axis];
    let h = cell_size[axis];
    let extent = core[axis] + pad_lo + pad_hi;
    let exponent = ((extent / h).log2().floor().max(-1.0) + 1.0) as u32;
    let Some(n) = 1u32.checked_shl(exponent) else {
      shape[axis] = u32::MAX;
      return Err(TreeError::InvalidShape(shape));
    };
    shape[axis] = n;
    origin[axis] = core_min[axis] - pad_lo - (n as f64 * h - extent) / 2.0;
  }

  let grid = TreeGrid::new(origin, cell_size, shape)?;
  Ok(TreeMesh::new(grid))
}
