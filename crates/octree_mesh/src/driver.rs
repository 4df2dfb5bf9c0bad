//! Octree mesh creation from build parameters.
//!
//! The driver builds the base tree around the core object, applies the
//! minimum refinement floor, runs every refinement in declaration order,
//! finalizes once and encodes the result as an [`OctreeMesh`].

use tracing::{debug, info, warn};

use crate::codec::{treemesh_2_octree, OctreeMesh};
use crate::engine::TreeEngine;
use crate::error::{OctreeError, Result};
use crate::geometry::Entity;
use crate::octree::mesh_builder_xyz;
use crate::params::{BuildParams, Refinement};
use crate::strategy::{
  minimum_level, refine_tree_from_curve, refine_tree_from_points, refine_tree_from_surface,
  refine_tree_from_triangulation, RefinementMode,
};
use crate::workspace::Workspace;

/// Runs octree builds for one set of parameters.
#[derive(Clone, Debug)]
pub struct OctreeDriver {
  params: BuildParams,
}

impl OctreeDriver {
  pub fn new(params: BuildParams) -> Self {
    Self { params }
  }

  pub fn params(&self) -> &BuildParams {
    &self.params
  }

  /// Build the octree and add it to `workspace`.
  pub fn run(&self, workspace: &mut Workspace) -> Result<OctreeMesh> {
    let octree = Self::octree_from_params(workspace, &self.params)?;
    info!(
      name = %octree.name,
      cells = octree.n_cells(),
      "octree mesh added to workspace"
    );
    workspace.add_entity(Entity::Octree(octree.clone()));
    Ok(octree)
  }

  /// Build an octree mesh from `params` and the entities of `workspace`.
  #[tracing::instrument(skip_all, name = "octree_from_params")]
  pub fn octree_from_params(workspace: &Workspace, params: &BuildParams) -> Result<OctreeMesh> {
    let core = workspace
      .get_entity(&params.objects)
      .ok_or_else(|| OctreeError::MissingCoreObject(params.objects.clone()))?;
    let vertices = core
      .locations()
      .ok_or_else(|| OctreeError::LocationsUnavailable(core.name().to_string()))?;

    let mut mesh = mesh_builder_xyz(
      &vertices,
      params.cell_size(),
      params.get_padding(),
      params.depth_core,
    )?;
    info!(
      core = core.name(),
      shape = ?mesh.shape(),
      max_level = mesh.max_level(),
      "base mesh"
    );

    build_tree(&mut mesh, workspace, params)?;
    treemesh_2_octree(&mesh, &params.ga_group_name)
  }
}

/// Minimum refinement, every refinement, then a single finalize.
#[tracing::instrument(skip_all, name = "build_tree")]
pub fn build_tree<E: TreeEngine>(mesh: &mut E, workspace: &Workspace, params: &BuildParams) -> Result<()> {
  let floor = minimum_level(mesh, params.minimum_level);
  debug!(level = floor, "minimum refinement");
  mesh.refine(floor, params.diagonal_balance, false)?;

  for (name, refinement) in params.active_refinements() {
    let Some(entity) = workspace.get_entity(name) else {
      warn!(object = name, "refinement object not found, skipping");
      continue;
    };
    apply_refinement(mesh, entity, refinement, params.diagonal_balance)?;
  }

  mesh.finalize()?;
  info!(cells = mesh.n_cells(), "tree finalized");
  Ok(())
}

fn apply_refinement<E: TreeEngine>(
  mesh: &mut E,
  entity: &Entity,
  refinement: &Refinement,
  diagonal_balance: bool,
) -> Result<()> {
  let mode = RefinementMode::resolve(entity, refinement.horizon)?;
  info!(
    object = entity.name(),
    ?mode,
    levels = %refinement.levels,
    "refinement"
  );

  let levels = &refinement.levels;
  match mode {
    RefinementMode::Ball => refine_tree_from_points(mesh, entity, levels, diagonal_balance, false),
    RefinementMode::Curve => refine_tree_from_curve(mesh, entity, levels, diagonal_balance, false),
    RefinementMode::Horizon => {
      refine_tree_from_surface(mesh, entity, levels, diagonal_balance, refinement.distance, false)
    }
    RefinementMode::TriangulatedSurface => {
      refine_tree_from_triangulation(mesh, entity, levels, diagonal_balance, false)
    }
  }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;
