//! Object-type refinement strategies.
//!
//! Each strategy turns a geometry and a [`LevelSchedule`] into engine calls.
//! Schedule index `i` targets level `max_level - i`: index 0 is the finest
//! level, larger indices reach further out at coarser levels.

pub mod curve;
pub mod horizon;
pub mod points;
pub mod triangulation;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result};
use crate::geometry::Entity;

pub use curve::refine_tree_from_curve;
pub use horizon::refine_tree_from_surface;
pub use points::{refine_tree_from_locations, refine_tree_from_points};
pub use triangulation::refine_tree_from_triangulation;

/// Number of cells requested per level, finest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule", into = "Vec<u32>")]
pub struct LevelSchedule(Vec<u32>);

/// Accepted serialised forms: `[4, 4, 2]` or `"4, 4, 2"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSchedule {
  List(Vec<u32>),
  Text(String),
}

impl TryFrom<RawSchedule> for LevelSchedule {
  type Error = String;

  fn try_from(raw: RawSchedule) -> std::result::Result<Self, Self::Error> {
    match raw {
      RawSchedule::List(levels) => Ok(Self(levels)),
      RawSchedule::Text(text) => text.parse(),
    }
  }
}

impl std::str::FromStr for LevelSchedule {
  type Err = String;

  fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
    text
      .split(',')
      .map(str::trim)
      .filter(|item| !item.is_empty())
      .map(|item| {
        item
          .parse::<u32>()
          .map_err(|e| format!("invalid level count '{item}': {e}"))
      })
      .collect::<std::result::Result<Vec<_>, _>>()
      .map(Self)
  }
}

impl From<LevelSchedule> for Vec<u32> {
  fn from(schedule: LevelSchedule) -> Self {
    schedule.0
  }
}

impl From<Vec<u32>> for LevelSchedule {
  fn from(levels: Vec<u32>) -> Self {
    Self(levels)
  }
}

impl fmt::Display for LevelSchedule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let items: Vec<String> = self.0.iter().map(u32::to_string).collect();
    write!(f, "{}", items.join(", "))
  }
}

impl LevelSchedule {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// `(index, count)` pairs, finest first.
  pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
    self.0.iter().copied().enumerate()
  }

  /// Fail when the schedule reaches past the coarsest level of the tree.
  pub fn check_depth(&self, max_level: u32) -> Result<()> {
    if self.0.len() > max_level as usize + 1 {
      return Err(OctreeError::InvalidSchedule {
        length: self.0.len(),
        depth: max_level + 1,
      });
    }
    Ok(())
  }
}

/// Refinement algorithm selected for one refinement entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefinementMode {
  /// Balls around every location.
  Ball,
  /// Balls around a densified polyline.
  Curve,
  /// Stacked sheets below an elevation surface.
  Horizon,
  /// Shells offset along vertex normals.
  TriangulatedSurface,
}

impl RefinementMode {
  /// The horizon flag wins over the entity kind.
  pub fn resolve(entity: &Entity, horizon: bool) -> Result<Self> {
    if horizon {
      return Ok(Self::Horizon);
    }
    match entity {
      Entity::Curve(_) => Ok(Self::Curve),
      Entity::Surface(_) => Ok(Self::TriangulatedSurface),
      Entity::Points(_) => Ok(Self::Ball),
      Entity::Octree(_) => Err(OctreeError::NotImplemented(format!(
        "refinement around {} object '{}'",
        entity.kind(),
        entity.name()
      ))),
    }
  }
}

/// Cell size along `axis` at schedule index `level`.
#[inline]
pub fn cell_size_from_level<E: TreeEngine>(mesh: &E, level: usize, axis: usize) -> f64 {
  mesh.base_cell_size()[axis] * 2f64.powi(level as i32)
}

/// Tree level reached by a minimum refinement of `level` levels.
#[inline]
pub fn minimum_level<E: TreeEngine>(mesh: &E, level: u32) -> u32 {
  (mesh.max_level() as i64 - level as i64 + 1).max(1) as u32
}
