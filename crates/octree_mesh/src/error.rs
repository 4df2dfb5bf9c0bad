//! Error types for tree construction, refinement and encoding.

use thiserror::Error;

/// Type alias for results of the refinement pipeline.
pub type Result<T> = std::result::Result<T, OctreeError>;

/// Failures raised by a tree engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
  /// Cell counts must be non-zero powers of two
  #[error("Invalid grid shape {0:?}: counts must be powers of two")]
  InvalidShape([u32; 3]),

  /// Base cell sizes must be finite and positive
  #[error("Invalid base cell size {0:?}")]
  InvalidCellSize([f64; 3]),

  /// Requested level outside `0..=max_level`
  #[error("Level {level} is outside 0..={max_level}")]
  InvalidLevel { level: i64, max_level: u32 },

  /// Mutation after finalization
  #[error("Tree is finalized and can no longer be refined")]
  Finalized,

  /// Introspection before finalization
  #[error("Tree must be finalized first")]
  NotFinalized,

  /// Inconsistent cell state or geometry input
  #[error("Invalid tree state: {0}")]
  InvalidState(String),

  /// Parallel input arrays of different length
  #[error("Length mismatch: expected {expected}, found {found}")]
  LengthMismatch { expected: usize, found: usize },
}

/// Failures raised while building, encoding or merging octree meshes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OctreeError {
  /// Entity kind does not fit the refinement mode
  #[error("Object '{name}' must be a {expected} with cells")]
  InvalidGeometryType { name: String, expected: &'static str },

  /// Entity carries no vertices
  #[error("Object '{0}' has no locations to refine around")]
  LocationsUnavailable(String),

  /// Valid input the pipeline has no conversion for
  #[error("Not implemented: {0}")]
  NotImplemented(String),

  #[error("Meshes must have the same dimensions")]
  DimensionMismatch,

  #[error("Meshes must have the same origin")]
  OriginMismatch,

  /// Local mesh cell size differs from the global mesh
  #[error("Mesh '{0}' cell size differs from the global mesh")]
  CellSizeMismatch(String),

  #[error("Core object '{0}' was not found in the workspace")]
  MissingCoreObject(String),

  /// Mesh table carries no cells
  #[error("Mesh '{0}' has no octree cells")]
  MissingCells(String),

  /// Level schedule longer than the tree is deep
  #[error("Schedule of length {length} exceeds tree depth {depth}")]
  InvalidSchedule { length: usize, depth: u32 },

  #[error(transparent)]
  Engine(#[from] TreeError),
}
