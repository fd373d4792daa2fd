//! Terrain heightmap baker.
//!
//! Samples an OBJ mesh from above on a regular grid and writes the result as
//! a terrain heightmap:
//! - `<name>.png`: 16-bit grayscale preview / import source
//! - `<name>.raw`: 16-bit little-endian RAW for terrain importers
//! - `<name>.json`: terrain size and generation settings

mod config;
mod obj;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mesh_terrain::{generate_with, SampleOptions, TerrainAsset};
use std::path::{Path, PathBuf};

use config::Config;
use obj::ObjGeometry;
use output::Manifest;

/// Terrain heightmap baker for mesh_terrain.
#[derive(Parser, Debug)]
#[command(name = "bake_heightmap")]
#[command(about = "Bakes an OBJ mesh into a terrain heightmap")]
struct Args {
	/// Path to configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Output directory (default: output_dir from the config, relative to it).
	#[arg(short, long)]
	output_dir: Option<PathBuf>,

	/// Sample rows on the calling thread only.
	#[arg(long)]
	sequential: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let config_dir = args.config.parent().unwrap_or(Path::new(".")).to_path_buf();

	println!("Loading config from: {}", args.config.display());
	let config = Config::load(&args.config)?;

	let mesh_path = config_dir.join(&config.mesh);
	println!("Loading mesh: {}", mesh_path.display());
	let mesh = ObjGeometry::load(&mesh_path)?.into_mesh()?;

	let params = config.parameters();
	println!(
		"Sampling {} triangles at {}x{} resolution",
		mesh.triangle_count(),
		params.resolution,
		params.resolution
	);

	let pb = ProgressBar::new(params.resolution as u64);
	pb.set_style(
		ProgressStyle::default_bar()
			.template("[{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg}")?
			.progress_chars("▉▊▋▌▍▎▏ "),
	);
	pb.set_message("Casting rays");

	let report = |current: u32, _total: u32| pb.set_position(current as u64);
	let options = SampleOptions::new()
		.with_progress(&report)
		.with_parallel(!args.sequential);

	let output = generate_with(&mesh, &params, &options)
		.with_context(|| format!("Failed to sample {}", mesh_path.display()))?;
	pb.finish_with_message("Heights sampled");

	println!(
		"  {} of {} rays hit the mesh in {:.1} ms",
		output.hit_count,
		output.layout.ray_count(),
		output.elapsed_us as f64 / 1000.0
	);

	let manifest = Manifest::new(&config.name, &params, &output);
	let asset = TerrainAsset::from_output(config.name.as_str(), output);

	let output_dir = args
		.output_dir
		.unwrap_or_else(|| config_dir.join(&config.output_dir));
	let files = output::write_outputs(&output_dir, &asset, &manifest)?;

	for path in [&files.png, &files.raw, &files.manifest] {
		if let Some(file_name) = path.file_name() {
			println!("  ✓ {}", file_name.to_string_lossy());
		}
	}

	println!(
		"\nDone! Terrain size {} x {} x {} written to: {}",
		asset.size.x,
		asset.size.y,
		asset.size.z,
		output_dir.display()
	);

	Ok(())
}
