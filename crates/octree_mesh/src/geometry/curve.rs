//! Polylines: part labelling and arc-length densification.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Polyline entity: vertices joined by two-vertex segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
  pub name: String,
  pub vertices: Vec<DVec3>,
  /// Segments as vertex index pairs.
  #[serde(default)]
  pub cells: Vec<[usize; 2]>,
  /// Optional part label per vertex.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parts: Option<Vec<u32>>,
}

impl Curve {
  /// Part label per vertex.
  ///
  /// Explicit labels win; otherwise vertices are labelled by connected
  /// component of the segment graph, numbered in order of first vertex.
  pub fn part_labels(&self) -> Vec<u32> {
    match &self.parts {
      Some(parts) => parts.clone(),
      None => connected_parts(self.vertices.len(), &self.cells),
    }
  }

  /// Whether every segment indexes an existing vertex.
  pub fn indices_in_range(&self) -> bool {
    self.cells.iter().flatten().all(|&i| i < self.vertices.len())
  }
}

/// Disjoint-set (union-find) with path compression.
struct UnionFind {
  parent: Vec<u32>,
}

impl UnionFind {
  fn new(n: usize) -> Self {
    Self {
      parent: (0..n as u32).collect(),
    }
  }

  fn find(&mut self, x: u32) -> u32 {
    let idx = x as usize;
    let p = self.parent[idx];
    if p != x {
      let root = self.find(p);
      self.parent[idx] = root;
    }
    self.parent[idx]
  }

  /// The smaller index always becomes the representative.
  fn union_keep_min(&mut self, a: u32, b: u32) {
    let ra = self.find(a);
    let rb = self.find(b);
    if ra != rb {
      let (min, max) = if ra <= rb { (ra, rb) } else { (rb, ra) };
      self.parent[max as usize] = min;
    }
  }
}

/// Label vertices by connected component of the segment graph.
pub fn connected_parts(n_vertices: usize, cells: &[[usize; 2]]) -> Vec<u32> {
  let mut sets = UnionFind::new(n_vertices);
  for &[a, b] in cells {
    if a < n_vertices && b < n_vertices {
      sets.union_keep_min(a as u32, b as u32);
    }
  }

  // Roots are minimal indices, so labels follow first appearance.
  let mut labels = vec![0u32; n_vertices];
  let mut root_label = vec![u32::MAX; n_vertices];
  let mut next = 0;
  for vertex in 0..n_vertices {
    let root = sets.find(vertex as u32) as usize;
    if root_label[root] == u32::MAX {
      root_label[root] = next;
      next += 1;
    }
    labels[vertex] = root_label[root];
  }
  labels
}

/// Resample an ordered vertex run along its arc length.
///
/// Samples are the original vertices plus every multiple of `increment`
/// below the total length, sorted and de-duplicated.
pub fn resample_locations(vertices: &[DVec3], increment: f64) -> Vec<DVec3> {
  let Some(&first) = vertices.first() else {
    return Vec::new();
  };

  let mut cumulative = Vec::with_capacity(vertices.len());
  let mut total = 0.0;
  cumulative.push(0.0);
  for pair in vertices.windows(2) {
    total += pair[0].distance(pair[1]);
    cumulative.push(total);
  }

  let mut distances = cumulative.clone();
  if increment > 0.0 {
    let steps = (total / increment).ceil() as usize;
    distances.extend((0..steps).map(|i| i as f64 * increment).filter(|d| *d < total));
  }
  distances.sort_by(f64::total_cmp);
  distances.dedup();

  distances
    .into_iter()
    .map(|d| {
      let upper = cumulative.partition_point(|c| *c <= d);
      if upper == 0 {
        first
      } else if upper >= vertices.len() {
        vertices[vertices.len() - 1]
      } else {
        let (c0, c1) = (cumulative[upper - 1], cumulative[upper]);
        let t = (d - c0) / (c1 - c0);
        vertices[upper - 1].lerp(vertices[upper], t)
      }
    })
    .collect()
}

/// Densify every part of a curve so consecutive points are at most
/// `increment` apart.
///
/// Each part runs through the first vertex of each of its segments, closed by
/// the second vertex of the last one. Parts without segments are skipped, as
/// are segments indexing missing vertices.
pub fn densify_curve(curve: &Curve, increment: f64) -> Vec<DVec3> {
  let labels = curve.part_labels();
  let n_vertices = curve.vertices.len();
  let mut part_ids: Vec<u32> = labels.clone();
  part_ids.sort_unstable();
  part_ids.dedup();

  let label_of = |i: usize| labels.get(i).copied();
  let mut locations = Vec::new();

  for part in part_ids {
    let segments: Vec<&[usize; 2]> = curve
      .cells
      .iter()
      .filter(|[a, b]| *a < n_vertices && *b < n_vertices)
      .filter(|[a, b]| label_of(*a) == Some(part) && label_of(*b) == Some(part))
      .collect();
    let Some(last) = segments.last() else {
      continue;
    };

    let mut run: Vec<DVec3> = segments.iter().map(|[a, _]| curve.vertices[*a]).collect();
    run.push(curve.vertices[last[1]]);
    locations.extend(resample_locations(&run, increment));
  }

  locations
}
