//! Implicit octree engine.
//!
//! Leaves define the tree structure. No explicit tree nodes are maintained -
//! parent/child relationships are computed on-demand via coordinate math.
//!
//! # Level Convention
//!
//! `max_level` = one base cell. With `ls = log2(count)` per axis,
//! `max_level = ls` on cubic grids and `min(ls) + 1` otherwise. Root blocks
//! sit at `root_level = max_level - min(ls)`.
//!
//! ```text
//! Cell Size = base_cell_size * 2^(max_level - level)
//!
//! 16 x 4 x 8 grid: ls = (4, 2, 3), max_level = 3, root_level = 1
//!                  root blocks 4 x 4 x 4 base cells, 4 x 1 x 2 of them
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `OctreeNode` - immutable value type for tree positions
//! - [`grid`]: `TreeGrid` - base grid and coordinate math
//! - [`leaves`]: `OctreeLeaves` - implicit tree via HashSet<OctreeNode>
//! - [`refinement`]: split and 2:1 balance primitives
//! - [`tree_mesh`]: `TreeMesh` - the [`TreeEngine`](crate::TreeEngine)
//!   implementation
//! - [`builder`]: base mesh from object vertices

pub mod bounds;
pub mod builder;
pub mod grid;
pub mod leaves;
pub mod node;
pub mod refinement;
pub mod stats;
pub mod tree_mesh;

// Re-exports
pub use bounds::DAabb3;
pub use builder::mesh_builder_xyz;
pub use grid::TreeGrid;
pub use leaves::OctreeLeaves;
pub use node::OctreeNode;
pub use stats::RefinementStats;
pub use tree_mesh::TreeMesh;
