//! Octree mesh builder.
//!
//! Reads build parameters (TOML) and a workspace of named objects (JSON),
//! builds an adaptive octree mesh around the core object and writes the
//! workspace back with the new mesh added.
//!
//! Logging goes through `tracing`; set `RUST_LOG` to filter, or pass `-v`
//! to raise the default level to debug.

mod config;
mod io;

use anyhow::{Context, Result};
use clap::Parser;
use octree_mesh::{OctreeDriver, OctreeMesh};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Adaptive octree mesh builder.
#[derive(Parser, Debug)]
#[command(name = "octree_builder")]
#[command(about = "Builds an adaptive octree mesh around workspace objects")]
struct Args {
	/// Path to build parameters TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Workspace JSON file holding the objects.
	#[arg(short, long)]
	workspace: PathBuf,

	/// Output workspace (default: overwrite the input workspace).
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Debug logging unless RUST_LOG is set.
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let default_level = if args.verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

	let params = config::load_params(&args.config)?;
	let mut workspace = io::load_workspace(&args.workspace)?;
	println!(
		"Loaded {} objects from: {}",
		workspace.len(),
		args.workspace.display()
	);

	let driver = OctreeDriver::new(params);
	let octree = driver
		.run(&mut workspace)
		.with_context(|| format!("Building octree mesh '{}'", driver.params().ga_group_name))?;

	print_summary(&octree);

	let output = args.output.as_ref().unwrap_or(&args.workspace);
	io::save_workspace(output, &workspace)?;
	println!("\nDone! Workspace written to: {}", output.display());

	Ok(())
}

/// Print mesh header and the number of cells per cell width.
fn print_summary(octree: &OctreeMesh) {
	println!("\nOctree mesh '{}'", octree.name);
	println!(
		"  base cells: {} x {} x {}",
		octree.u_count, octree.v_count, octree.w_count
	);
	println!(
		"  cell size:  {} x {} x {}",
		octree.u_cell_size, octree.v_cell_size, octree.w_cell_size
	);
	println!("  origin:     {}", octree.origin);
	println!("  cells:      {}", octree.n_cells());

	let mut widths: BTreeMap<u32, usize> = BTreeMap::new();
	for cell in &octree.octree_cells {
		*widths.entry(cell.n_cells).or_default() += 1;
	}
	for (width, count) in widths {
		println!("    {width:>5} base cells wide: {count}");
	}
}
