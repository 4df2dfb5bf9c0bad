//! Elevation interpolation over a horizontal Delaunay triangulation.

use delaunator::{triangulate, Point};
use glam::{DVec2, DVec3};
use rstar::{RTree, RTreeObject, AABB};

/// Barycentric tolerance for points on triangle edges.
const EDGE_TOLERANCE: f64 = 1e-10;

struct TriangleEnvelope {
  index: usize,
  env: AABB<[f64; 2]>,
}

impl RTreeObject for TriangleEnvelope {
  type Envelope = AABB<[f64; 2]>;

  #[inline]
  fn envelope(&self) -> Self::Envelope {
    self.env
  }
}

/// Linear elevation interpolator over the (x, y) projection of a point
/// cloud, with a nearest-point index over the same projection.
pub struct HorizonInterpolator {
  xy: Vec<DVec2>,
  z: Vec<f64>,
  triangles: Vec<[usize; 3]>,
  triangle_index: RTree<TriangleEnvelope>,
  point_index: RTree<[f64; 2]>,
}

impl HorizonInterpolator {
  /// Triangulate the horizontal projection of `locations`.
  ///
  /// Degenerate (collinear) inputs produce no triangles, so nothing lies
  /// inside.
  pub fn new(locations: &[DVec3]) -> Self {
    let xy: Vec<DVec2> = locations.iter().map(|p| p.truncate()).collect();
    let z = locations.iter().map(|p| p.z).collect();

    let points: Vec<Point> = xy.iter().map(|p| Point { x: p.x, y: p.y }).collect();
    let triangulation = triangulate(&points);
    let triangles: Vec<[usize; 3]> = triangulation
      .triangles
      .chunks_exact(3)
      .map(|t| [t[0], t[1], t[2]])
      .collect();

    let envelopes = triangles
      .iter()
      .enumerate()
      .map(|(index, t)| {
        let (a, b, c) = (xy[t[0]], xy[t[1]], xy[t[2]]);
        TriangleEnvelope {
          index,
          env: AABB::from_corners(a.min(b).min(c).to_array(), a.max(b).max(c).to_array()),
        }
      })
      .collect();

    Self {
      point_index: RTree::bulk_load(xy.iter().map(|p| p.to_array()).collect()),
      triangle_index: RTree::bulk_load(envelopes),
      xy,
      z,
      triangles,
    }
  }

  /// Number of triangles in the horizontal triangulation.
  pub fn n_triangles(&self) -> usize {
    self.triangles.len()
  }

  /// Barycentric weights of `p` in triangle `t`, if inside.
  fn weights(&self, t: &[usize; 3], p: DVec2) -> Option<[f64; 3]> {
    let (a, b, c) = (self.xy[t[0]], self.xy[t[1]], self.xy[t[2]]);
    let det = (b - a).perp_dot(c - a);
    if det.abs() < f64::EPSILON {
      return None;
    }
    let wb = (p - a).perp_dot(c - a) / det;
    let wc = (b - a).perp_dot(p - a) / det;
    let wa = 1.0 - wb - wc;
    let inside = [wa, wb, wc].iter().all(|w| *w >= -EDGE_TOLERANCE);
    inside.then_some([wa, wb, wc])
  }

  /// Interpolated elevation at `(x, y)`, or None outside the convex hull.
  pub fn interpolate(&self, p: DVec2) -> Option<f64> {
    self
      .triangle_index
      .locate_in_envelope_intersecting(&AABB::from_point(p.to_array()))
      .find_map(|env| {
        let t = &self.triangles[env.index];
        let [wa, wb, wc] = self.weights(t, p)?;
        Some(wa * self.z[t[0]] + wb * self.z[t[1]] + wc * self.z[t[2]])
      })
  }

  /// Horizontal distance to the nearest original point.
  pub fn nearest_distance(&self, p: DVec2) -> f64 {
    self
      .point_index
      .nearest_neighbor(&p.to_array())
      .map_or(f64::INFINITY, |q| p.distance(DVec2::from_array(*q)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tilted_square() -> HorizonInterpolator {
    // z = x + 2y
    HorizonInterpolator::new(&[
      DVec3::new(0.0, 0.0, 0.0),
      DVec3::new(10.0, 0.0, 10.0),
      DVec3::new(10.0, 10.0, 30.0),
      DVec3::new(0.0, 10.0, 20.0),
    ])
  }

  #[test]
  fn test_interpolates_plane_exactly() {
    let horizon = tilted_square();
    assert_eq!(horizon.n_triangles(), 2);
    let z = horizon.interpolate(DVec2::new(2.5, 4.0)).unwrap();
    assert!((z - 10.5).abs() < 1e-9);
  }

  #[test]
  fn test_outside_hull() {
    let horizon = tilted_square();
    assert!(horizon.interpolate(DVec2::new(-1.0, 5.0)).is_none());
    assert!(horizon.interpolate(DVec2::new(5.0, 10.5)).is_none());
    // Hull vertices and edges count as inside
    assert!(horizon.interpolate(DVec2::new(0.0, 0.0)).is_some());
    assert!(horizon.interpolate(DVec2::new(5.0, 0.0)).is_some());
  }

  #[test]
  fn test_nearest_distance() {
    let horizon = tilted_square();
    assert!((horizon.nearest_distance(DVec2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
  }

  #[test]
  fn test_collinear_points_have_no_interior() {
    let horizon = HorizonInterpolator::new(&[DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)]);
    assert_eq!(horizon.n_triangles(), 0);
    assert!(horizon.interpolate(DVec2::new(1.0, 0.0)).is_none());
  }
}
