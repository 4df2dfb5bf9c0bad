//! Axis-aligned bounding box with double precision for cell extents.

use glam::DVec3;
use rstar::AABB;

/// Double-precision axis-aligned bounding box.
///
/// Used for cell extents during refinement and for object extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl DAabb3 {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Smallest box enclosing all points, or None for an empty slice.
  pub fn from_points(points: &[DVec3]) -> Option<Self> {
    let first = *points.first()?;
    let (min, max) = points
      .iter()
      .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    Some(Self { min, max })
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  /// Squared distance from a point to the box (0 inside).
  #[inline]
  pub fn distance_squared_to_point(&self, point: DVec3) -> f64 {
    let clamped = point.clamp(self.min, self.max);
    point.distance_squared(clamped)
  }

  /// Box grown by `margin` on every side.
  #[inline]
  pub fn expanded(&self, margin: f64) -> Self {
    Self {
      min: self.min - DVec3::splat(margin),
      max: self.max + DVec3::splat(margin),
    }
  }

  /// Envelope for R-tree queries.
  #[inline]
  pub fn envelope(&self) -> AABB<[f64; 3]> {
    AABB::from_corners(self.min.to_array(), self.max.to_array())
  }

  /// Separating-axis overlap test against a triangle.
  ///
  /// Touching counts as overlapping.
  pub fn intersects_triangle(&self, a: DVec3, b: DVec3, c: DVec3) -> bool {
    let center = self.center();
    let half = self.size() * 0.5;
    let v = [a - center, b - center, c - center];
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    let separated = |axis: DVec3| -> bool {
      if axis.length_squared() < 1e-30 {
        return false;
      }
      let p0 = v[0].dot(axis);
      let p1 = v[1].dot(axis);
      let p2 = v[2].dot(axis);
      let radius = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
      p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius
    };

    for box_axis in [DVec3::X, DVec3::Y, DVec3::Z] {
      if separated(box_axis) {
        return false;
      }
      for edge in edges {
        if separated(edge.cross(box_axis)) {
          return false;
        }
      }
    }

    !separated(edges[0].cross(edges[1]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new() {
    let aabb = DAabb3::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.min, DVec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, DVec3::new(1.0, 2.0, 3.0));
  }

  #[test]
  fn test_from_points() {
    let aabb = DAabb3::from_points(&[
      DVec3::new(1.0, -4.0, 2.0),
      DVec3::new(-3.0, 5.0, 0.0),
      DVec3::new(0.0, 0.0, 7.0),
    ])
    .unwrap();
    assert_eq!(aabb.min, DVec3::new(-3.0, -4.0, 0.0));
    assert_eq!(aabb.max, DVec3::new(1.0, 5.0, 7.0));
    assert!(DAabb3::from_points(&[]).is_none());
  }

  #[test]
  fn test_contains_point() {
    let aabb = DAabb3::new(DVec3::ZERO, DVec3::splat(10.0));

    // Inside
    assert!(aabb.contains_point(DVec3::splat(5.0)));

    // On boundary
    assert!(aabb.contains_point(DVec3::ZERO));
    assert!(aabb.contains_point(DVec3::splat(10.0)));

    // Outside
    assert!(!aabb.contains_point(DVec3::splat(-1.0)));
    assert!(!aabb.contains_point(DVec3::splat(11.0)));
  }

  #[test]
  fn test_size_and_center() {
    let aabb = DAabb3::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.size(), DVec3::new(2.0, 4.0, 6.0));
    assert_eq!(aabb.center(), DVec3::ZERO);
  }

  #[test]
  fn test_distance_to_point() {
    let aabb = DAabb3::new(DVec3::ZERO, DVec3::splat(10.0));
    assert_eq!(aabb.distance_squared_to_point(DVec3::splat(5.0)), 0.0);
    assert_eq!(aabb.distance_squared_to_point(DVec3::new(13.0, 5.0, 5.0)), 9.0);
    assert_eq!(aabb.distance_squared_to_point(DVec3::new(13.0, 14.0, 5.0)), 25.0);
  }

  #[test]
  fn test_triangle_crossing_box() {
    let aabb = DAabb3::new(DVec3::ZERO, DVec3::splat(1.0));
    // Large triangle slicing through the middle of the box
    assert!(aabb.intersects_triangle(
      DVec3::new(-5.0, -5.0, 0.5),
      DVec3::new(5.0, -5.0, 0.5),
      DVec3::new(0.0, 5.0, 0.5),
    ));
  }

  #[test]
  fn test_triangle_above_box() {
    let aabb = DAabb3::new(DVec3::ZERO, DVec3::splat(1.0));
    assert!(!aabb.intersects_triangle(
      DVec3::new(-5.0, -5.0, 1.5),
      DVec3::new(5.0, -5.0, 1.5),
      DVec3::new(0.0, 5.0, 1.5),
    ));
  }

  #[test]
  fn test_triangle_near_corner_separated_by_edge_axis() {
    let aabb = DAabb3::new(DVec3::ZERO, DVec3::splat(1.0));
    // Bounding boxes overlap but the triangle passes beside the corner.
    assert!(!aabb.intersects_triangle(
      DVec3::new(2.2, 0.0, 0.5),
      DVec3::new(0.0, 2.2, 0.5),
      DVec3::new(2.2, 2.2, 0.5),
    ));
    assert!(aabb.intersects_triangle(
      DVec3::new(1.2, 0.0, 0.5),
      DVec3::new(0.0, 1.2, 0.5),
      DVec3::new(1.2, 1.2, 0.5),
    ));
  }
}
