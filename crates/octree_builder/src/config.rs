//! Build parameter loading.

use anyhow::{Context, Result};
use octree_mesh::BuildParams;
use std::path::Path;

/// Load build parameters from a TOML file.
pub fn load_params(path: &Path) -> Result<BuildParams> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("Failed to read config file: {}", path.display()))?;
	parse_params(&content)
}

/// Parse, migrate and validate build parameters.
pub fn parse_params(content: &str) -> Result<BuildParams> {
	let mut params: BuildParams =
		toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
	params.migrate_legacy_refinements();

	for (axis, size) in ["u", "v", "w"].iter().zip(params.cell_size().to_array()) {
		if !size.is_finite() || size <= 0.0 {
			anyhow::bail!("{axis}_cell_size must be positive, got {size}");
		}
	}
	if params.horizontal_padding < 0.0 || params.vertical_padding < 0.0 {
		anyhow::bail!(
			"Padding must be non-negative, got {} horizontal and {} vertical",
			params.horizontal_padding,
			params.vertical_padding
		);
	}
	if params.depth_core < 0.0 {
		anyhow::bail!("depth_core must be non-negative, got {}", params.depth_core);
	}

	Ok(params)
}
