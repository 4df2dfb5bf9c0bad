//! Shared test fixtures: a call-recording engine, a warning counter and
//! sample geometry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::DVec3;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::engine::TreeEngine;
use crate::error::TreeError;

/// One recorded engine call.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
  Refine {
    level: u32,
    diagonal_balance: bool,
    finalize: bool,
  },
  RefineBall {
    n_centers: usize,
    radius: f64,
    level: u32,
    finalize: bool,
  },
  RefineSurface {
    vertices: Vec<DVec3>,
    n_triangles: usize,
    level: i32,
    finalize: bool,
  },
  InsertCells {
    points: Vec<DVec3>,
    levels: Vec<u32>,
    finalize: bool,
  },
  Finalize,
}

/// Engine that records every call and performs no refinement.
#[derive(Clone, Debug)]
pub struct RecordingEngine {
  pub max_level: u32,
  pub origin: DVec3,
  pub base_cell_size: DVec3,
  pub calls: Vec<EngineCall>,
  pub finalized: bool,
}

impl RecordingEngine {
  pub fn new(max_level: u32, base_cell_size: f64) -> Self {
    Self {
      max_level,
      origin: DVec3::ZERO,
      base_cell_size: DVec3::splat(base_cell_size),
      calls: Vec::new(),
      finalized: false,
    }
  }

  fn record(&mut self, call: EngineCall, finalize: bool) -> Result<(), TreeError> {
    if self.finalized {
      return Err(TreeError::Finalized);
    }
    self.calls.push(call);
    if finalize {
      self.finalize()?;
    }
    Ok(())
  }

  /// Radii of the recorded ball calls, in order.
  pub fn ball_radii(&self) -> Vec<(f64, u32)> {
    self
      .calls
      .iter()
      .filter_map(|call| match call {
        EngineCall::RefineBall { radius, level, .. } => Some((*radius, *level)),
        _ => None,
      })
      .collect()
  }
}

impl TreeEngine for RecordingEngine {
  fn max_level(&self) -> u32 {
    self.max_level
  }

  fn origin(&self) -> DVec3 {
    self.origin
  }

  fn base_cell_size(&self) -> DVec3 {
    self.base_cell_size
  }

  fn shape(&self) -> [u32; 3] {
    [1 << self.max_level; 3]
  }

  fn n_cells(&self) -> usize {
    1
  }

  fn is_finalized(&self) -> bool {
    self.finalized
  }

  fn refine(&mut self, level: u32, diagonal_balance: bool, finalize: bool) -> Result<(), TreeError> {
    self.record(
      EngineCall::Refine {
        level,
        diagonal_balance,
        finalize,
      },
      finalize,
    )
  }

  fn refine_ball(
    &mut self,
    centers: &[DVec3],
    radius: f64,
    level: u32,
    _diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    self.record(
      EngineCall::RefineBall {
        n_centers: centers.len(),
        radius,
        level,
        finalize,
      },
      finalize,
    )
  }

  fn refine_surface(
    &mut self,
    vertices: &[DVec3],
    triangles: &[[usize; 3]],
    level: i32,
    _diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    self.record(
      EngineCall::RefineSurface {
        vertices: vertices.to_vec(),
        n_triangles: triangles.len(),
        level,
        finalize,
      },
      finalize,
    )
  }

  fn insert_cells(
    &mut self,
    points: &[DVec3],
    levels: &[u32],
    _diagonal_balance: bool,
    finalize: bool,
  ) -> Result<(), TreeError> {
    self.record(
      EngineCall::InsertCells {
        points: points.to_vec(),
        levels: levels.to_vec(),
        finalize,
      },
      finalize,
    )
  }

  fn finalize(&mut self) -> Result<(), TreeError> {
    if self.finalized {
      return Err(TreeError::Finalized);
    }
    self.calls.push(EngineCall::Finalize);
    self.finalized = true;
    Ok(())
  }

  fn cell_centers(&self) -> Result<Vec<DVec3>, TreeError> {
    Ok(Vec::new())
  }

  fn cell_levels(&self) -> Result<Vec<u32>, TreeError> {
    Ok(Vec::new())
  }

  fn ubc_index_array(&self) -> Result<(Vec<[u32; 3]>, Vec<u32>), TreeError> {
    Ok((Vec::new(), Vec::new()))
  }

  fn ubc_order(&self) -> Result<Vec<usize>, TreeError> {
    Ok(Vec::new())
  }
}

/// Subscriber layer counting `WARN` events.
#[derive(Clone, Debug, Default)]
pub struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
  pub fn count(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    if *event.metadata().level() == Level::WARN {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }
}

/// Sixteen points on a 200 m circle with a wavy elevation, plus the origin.
pub fn circle_points() -> Vec<DVec3> {
  let n = 16;
  let mut points: Vec<DVec3> = (0..n)
    .map(|i| {
      let angle = std::f64::consts::TAU * i as f64 / (n - 1) as f64;
      DVec3::new(angle.cos() * 200.0, angle.sin() * 200.0, (angle * 2.0).sin() * 40.0)
    })
    .collect();
  points.push(DVec3::ZERO);
  points
}
