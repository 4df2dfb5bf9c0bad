//! Workspace persistence as JSON.

use anyhow::{Context, Result};
use octree_mesh::Workspace;
use std::path::Path;

/// Read a workspace from a JSON file.
pub fn load_workspace(path: &Path) -> Result<Workspace> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("Failed to read workspace: {}", path.display()))?;
	serde_json::from_str(&content)
		.with_context(|| format!("Failed to parse workspace JSON: {}", path.display()))
}

/// Write a workspace as pretty-printed JSON.
pub fn save_workspace(path: &Path, workspace: &Workspace) -> Result<()> {
	let content = serde_json::to_string_pretty(workspace).context("Failed to serialise workspace")?;
	std::fs::write(path, content)
		.with_context(|| format!("Failed to write workspace: {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use octree_mesh::{Entity, Points};

	#[test]
	fn test_workspace_file_round_trip() {
		let path = std::env::temp_dir().join(format!("octree_builder_io_{}.json", std::process::id()));
		let mut workspace = Workspace::new();
		workspace.add_entity(Entity::Points(Points {
			name: "pts".into(),
			vertices: vec![[1.0, 2.0, 3.0].into()],
		}));

		save_workspace(&path, &workspace).unwrap();
		let loaded = load_workspace(&path).unwrap();
		std::fs::remove_file(&path).ok();

		assert_eq!(loaded, workspace);
	}

	#[test]
	fn test_invalid_json_has_context() {
		let path = std::env::temp_dir().join(format!("octree_builder_bad_{}.json", std::process::id()));
		std::fs::write(&path, "{ not json").unwrap();
		let err = load_workspace(&path).unwrap_err();
		std::fs::remove_file(&path).ok();

		assert!(err.to_string().contains("Failed to parse workspace JSON"));
	}
}
