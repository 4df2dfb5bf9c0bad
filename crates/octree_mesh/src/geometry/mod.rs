//! Geometry entities consumed by refinement strategies.
//!
//! - [`Points`]: bare vertex cloud
//! - [`Curve`]: polyline with optional part labels
//! - [`Surface`]: triangulated surface
//! - [`OctreeMesh`]: a previously built octree cell table

pub mod curve;
pub mod horizon;
pub mod surface;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::codec::OctreeMesh;

pub use curve::{densify_curve, Curve};
pub use horizon::HorizonInterpolator;
pub use surface::{vertex_normals, Surface};

/// Point cloud entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Points {
  pub name: String,
  pub vertices: Vec<DVec3>,
}

/// Named entity stored in a workspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
  Points(Points),
  Curve(Curve),
  Surface(Surface),
  Octree(OctreeMesh),
}

impl Entity {
  pub fn name(&self) -> &str {
    match self {
      Entity::Points(p) => &p.name,
      Entity::Curve(c) => &c.name,
      Entity::Surface(s) => &s.name,
      Entity::Octree(o) => &o.name,
    }
  }

  /// Short kind label used in logs and errors.
  pub fn kind(&self) -> &'static str {
    match self {
      Entity::Points(_) => "points",
      Entity::Curve(_) => "curve",
      Entity::Surface(_) => "surface",
      Entity::Octree(_) => "octree",
    }
  }

  /// Spatial locations of the entity: vertices, or cell centroids for an
  /// octree. None when the entity carries no locations.
  pub fn locations(&self) -> Option<Vec<DVec3>> {
    let locations = match self {
      Entity::Points(p) => p.vertices.clone(),
      Entity::Curve(c) => c.vertices.clone(),
      Entity::Surface(s) => s.vertices.clone(),
      Entity::Octree(o) => o.centroids(),
    };
    (!locations.is_empty()).then_some(locations)
  }
}
