//! Named entity store.

use serde::{Deserialize, Serialize};

use crate::geometry::Entity;

/// Ordered collection of named entities.
///
/// Lookups return the first entity with a matching name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
  #[serde(default)]
  pub entities: Vec<Entity>,
}

impl Workspace {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_entity(&mut self, entity: Entity) {
    self.entities.push(entity);
  }

  pub fn get_entity(&self, name: &str) -> Option<&Entity> {
    self.entities.iter().find(|entity| entity.name() == name)
  }

  pub fn len(&self) -> usize {
    self.entities.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entities.is_empty()
  }
}

impl FromIterator<Entity> for Workspace {
  fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
    Self {
      entities: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use glam::DVec3;

  use super::*;
  use crate::geometry::Points;

  fn points(name: &str, x: f64) -> Entity {
    Entity::Points(Points {
      name: name.into(),
      vertices: vec![DVec3::new(x, 0.0, 0.0)],
    })
  }

  #[test]
  fn test_first_match_wins() {
    let workspace: Workspace = [points("a", 1.0), points("b", 2.0), points("a", 3.0)]
      .into_iter()
      .collect();

    assert_eq!(workspace.len(), 3);
    assert_eq!(workspace.get_entity("a"), Some(&points("a", 1.0)));
    assert_eq!(workspace.get_entity("c"), None);
  }

  #[test]
  fn test_entities_serialise_with_type_tag() {
    let mut workspace = Workspace::new();
    workspace.add_entity(points("pts", 1.0));

    let json = serde_json::to_string(&workspace).unwrap();
    assert!(json.contains("\"type\":\"Points\""));

    let back: Workspace = serde_json::from_str(&json).unwrap();
    assert_eq!(back, workspace);
  }
}
