//! Build parameters for octree mesh creation.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::strategy::LevelSchedule;

/// Parameters of one octree build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildParams {
  /// Name of the object defining the core of the mesh.
  pub objects: String,
  /// Cell size in the x-direction.
  pub u_cell_size: f64,
  /// Cell size in the y-direction.
  pub v_cell_size: f64,
  /// Cell size in the z-direction.
  pub w_cell_size: f64,
  /// Padding on both sides along x and y.
  pub horizontal_padding: f64,
  /// Padding on both sides along z.
  pub vertical_padding: f64,
  /// Depth of the core below the lowest core vertex.
  pub depth_core: f64,
  /// Limit level changes between diagonal neighbours to one.
  #[serde(default)]
  pub diagonal_balance: bool,
  /// Minimum number of refinement levels applied everywhere, which
  /// prevents excessive coarsening in the padding.
  #[serde(default = "default_minimum_level")]
  pub minimum_level: u32,
  /// Name of the produced octree entity.
  #[serde(default = "default_group_name")]
  pub ga_group_name: String,
  #[serde(default)]
  pub refinements: Vec<Refinement>,
}

/// One refinement around a named object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
  /// Object to refine around. Refinements without one are inactive.
  #[serde(default)]
  pub object: Option<String>,
  /// Number of cells per level, finest first.
  #[serde(default)]
  pub levels: LevelSchedule,
  /// Refine below the object as an elevation surface.
  #[serde(default)]
  pub horizon: bool,
  /// Horizon only: maximum horizontal distance to an object vertex.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub distance: Option<f64>,
  /// Deprecated selector, `"surface"` or `"radial"`.
  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
  pub legacy_type: Option<String>,
}

fn default_minimum_level() -> u32 {
  8
}

fn default_group_name() -> String {
  "Octree_Mesh".to_string()
}

impl BuildParams {
  /// Base cell size per axis.
  pub fn cell_size(&self) -> DVec3 {
    DVec3::new(self.u_cell_size, self.v_cell_size, self.w_cell_size)
  }

  /// Padding as `(lower, upper)` distances per axis.
  pub fn get_padding(&self) -> [[f64; 2]; 3] {
    [
      [self.horizontal_padding; 2],
      [self.horizontal_padding; 2],
      [self.vertical_padding; 2],
    ]
  }

  /// Refinements with an object to refine around.
  pub fn active_refinements(&self) -> impl Iterator<Item = (&str, &Refinement)> {
    self
      .refinements
      .iter()
      .filter_map(|r| r.object.as_deref().map(|name| (name, r)))
  }

  /// Rewrite refinements written against the deprecated `type` selector.
  ///
  /// `type = "surface"` becomes `horizon = true`, anything else
  /// `horizon = false`. Inactive refinements are dropped, and so is the
  /// distance of every non-horizon refinement.
  pub fn migrate_legacy_refinements(&mut self) {
    self.refinements.retain(|r| r.object.is_some());

    for (index, refinement) in self.refinements.iter_mut().enumerate() {
      if let Some(kind) = refinement.legacy_type.take() {
        refinement.horizon = kind == "surface";
        warn!(
          refinement = index,
          legacy_type = %kind,
          horizon = refinement.horizon,
          "refinement 'type' is deprecated, use 'horizon' instead"
        );
      }
      if !refinement.horizon {
        refinement.distance = None;
      }
    }
  }
}
