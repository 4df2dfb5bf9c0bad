//! octree_mesh - Adaptive octree meshes around geoscience objects
//!
//! Builds an octree spatial mesh from a core object, refined around point
//! clouds, curves and triangulated surfaces according to per-object level
//! schedules, and converts it to and from the flat UBC octree cell table.
//!
//! # Pipeline
//!
//! 1. [`mesh_builder_xyz`] sizes a power-of-two base grid around the core
//! 2. [`build_tree`] applies a minimum refinement, then every refinement
//!    strategy in [`strategy`], then finalizes
//! 3. [`treemesh_2_octree`] encodes the finalized tree as an [`OctreeMesh`]
//!
//! # Example
//!
//! ```ignore
//! use octree_mesh::{BuildParams, OctreeDriver, Workspace};
//!
//! let params: BuildParams = toml::from_str(&text)?;
//! let mut workspace: Workspace = serde_json::from_str(&json)?;
//!
//! let octree = OctreeDriver::new(params).run(&mut workspace)?;
//! println!("{} cells", octree.n_cells());
//! ```
//!
//! The tree engine sits behind [`TreeEngine`]; [`TreeMesh`] is the implicit
//! octree implementation shipped with the crate.

pub mod codec;
pub mod driver;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod merge;
pub mod octree;
pub mod params;
pub mod strategy;
pub mod workspace;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used items
pub use codec::{octree_2_treemesh, treemesh_2_octree, OctreeCell, OctreeMesh};
pub use driver::{build_tree, OctreeDriver};
pub use engine::TreeEngine;
pub use error::{OctreeError, Result, TreeError};
pub use geometry::{Curve, Entity, Points, Surface};
pub use merge::{collocate_octrees, create_octree_from_octrees, get_octree_attributes, OctreeAttributes, OctreeSource};
pub use octree::{mesh_builder_xyz, OctreeNode, TreeGrid, TreeMesh};
pub use params::{BuildParams, Refinement};
pub use strategy::{LevelSchedule, RefinementMode};
pub use workspace::Workspace;
