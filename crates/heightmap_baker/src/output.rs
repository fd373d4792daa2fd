//! Heightmap file writers.
//!
//! Each bake writes three files next to each other:
//! - `<name>.png`: 16-bit grayscale, row 0 = minimum Z
//! - `<name>.raw`: headerless 16-bit little-endian samples, same layout
//! - `<name>.json`: manifest with terrain size and generation settings

use anyhow::{Context, Result};
use image::{ImageBuffer, Luma};
use mesh_terrain::{GenerationParameters, OrientationMode, SampleOutput, TerrainAsset};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Sidecar describing how a heightmap was produced.
#[derive(Debug, Serialize)]
pub struct Manifest {
	pub name: String,
	pub resolution: u32,
	/// World size of the terrain [x, y, z].
	pub terrain_size: [f32; 3],
	/// Bounds of the source mesh.
	pub source_min: [f32; 3],
	pub source_max: [f32; 3],
	pub padding: [f32; 3],
	pub vertical_shift: f32,
	pub orientation: &'static str,
	pub hit_count: u64,
	pub ray_count: u64,
	pub elapsed_ms: f64,
	/// Project-relative path a terrain importer would save the asset to.
	pub asset_path: String,
}

impl Manifest {
	pub fn new(name: &str, params: &GenerationParameters, output: &SampleOutput) -> Self {
		let layout = &output.layout;
		Self {
			name: name.to_string(),
			resolution: layout.resolution,
			terrain_size: layout.padded_size.to_array(),
			source_min: layout.source_bounds.min.to_array(),
			source_max: layout.source_bounds.max.to_array(),
			padding: params.padding.to_array(),
			vertical_shift: params.vertical_shift,
			orientation: match params.orientation {
				OrientationMode::BottomUp => "bottom_up",
				OrientationMode::TopDown => "top_down",
			},
			hit_count: output.hit_count,
			ray_count: layout.ray_count(),
			elapsed_ms: output.elapsed_us as f64 / 1000.0,
			asset_path: mesh_terrain::asset::asset_path(name),
		}
	}
}

/// Paths written by [`write_outputs`].
#[derive(Debug)]
pub struct WrittenFiles {
	pub png: PathBuf,
	pub raw: PathBuf,
	pub manifest: PathBuf,
}

/// Write PNG, RAW and manifest for `asset` into `output_dir`.
pub fn write_outputs(output_dir: &Path, asset: &TerrainAsset, manifest: &Manifest) -> Result<WrittenFiles> {
	std::fs::create_dir_all(output_dir)
		.with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

	let files = WrittenFiles {
		png: output_dir.join(format!("{}.png", asset.name)),
		raw: output_dir.join(format!("{}.raw", asset.name)),
		manifest: output_dir.join(format!("{}.json", asset.name)),
	};

	let resolution = asset.heightmap.resolution();
	let image: ImageBuffer<Luma<u16>, Vec<u16>> =
		ImageBuffer::from_raw(resolution, resolution, asset.heightmap.to_u16())
			.context("Heightmap size does not match its resolution")?;
	image
		.save(&files.png)
		.with_context(|| format!("Failed to write: {}", files.png.display()))?;

	std::fs::write(&files.raw, asset.to_raw_u16_le())
		.with_context(|| format!("Failed to write: {}", files.raw.display()))?;

	let json = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
	std::fs::write(&files.manifest, json)
		.with_context(|| format!("Failed to write: {}", files.manifest.display()))?;

	Ok(files)
}
