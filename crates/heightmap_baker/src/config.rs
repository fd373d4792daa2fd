//! Configuration parsing for heightmap baking.

use anyhow::{Context, Result};
use glam::Vec3;
use mesh_terrain::{GenerationParameters, OrientationMode, DEFAULT_RESOLUTION, DEFAULT_TERRAIN_NAME};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration for a heightmap bake.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Terrain name, used for output file names.
	#[serde(default = "default_name")]
	pub name: String,
	/// Path to the source OBJ mesh, relative to the config file.
	pub mesh: PathBuf,
	/// Heightmap samples per side.
	#[serde(default = "default_resolution")]
	pub resolution: u32,
	/// Extra world space around the mesh [x, y, z].
	#[serde(default)]
	pub padding: [f32; 3],
	/// Height offset in units of the mesh height, -1.0 to 1.0.
	#[serde(default)]
	pub vertical_shift: f32,
	/// Height scaling mode.
	#[serde(default)]
	pub orientation: Orientation,
	/// Output directory relative to the config file.
	#[serde(default = "default_output_dir")]
	pub output_dir: String,
}

/// Height scaling mode as written in TOML.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
	#[default]
	BottomUp,
	TopDown,
}

impl From<Orientation> for OrientationMode {
	fn from(orientation: Orientation) -> Self {
		match orientation {
			Orientation::BottomUp => OrientationMode::BottomUp,
			Orientation::TopDown => OrientationMode::TopDown,
		}
	}
}

fn default_name() -> String {
	DEFAULT_TERRAIN_NAME.to_string()
}

fn default_resolution() -> u32 {
	DEFAULT_RESOLUTION
}

fn default_output_dir() -> String {
	"Terrain Assets".to_string()
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate configuration TOML.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config =
			toml::from_str(content).with_context(|| "Failed to parse config TOML")?;

		if config.name.trim().is_empty() {
			anyhow::bail!("name must not be empty");
		}
		if config.resolution == 0 {
			anyhow::bail!("resolution must be at least 1");
		}
		if !config.padding.iter().all(|p| p.is_finite()) {
			anyhow::bail!("padding must be finite, got {:?}", config.padding);
		}
		if !(-1.0..=1.0).contains(&config.vertical_shift) {
			anyhow::bail!(
				"vertical_shift must be between -1.0 and 1.0, got {}",
				config.vertical_shift
			);
		}

		Ok(config)
	}

	/// Sampling parameters for this bake.
	pub fn parameters(&self) -> GenerationParameters {
		GenerationParameters::new()
			.with_resolution(self.resolution)
			.with_padding(Vec3::from_array(self.padding))
			.with_vertical_shift(self.vertical_shift)
			.with_orientation(self.orientation.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::parse(r#"mesh = "island.obj""#).unwrap();

		assert_eq!(config.name, "Generated Terrain");
		assert_eq!(config.resolution, 512);
		assert_eq!(config.padding, [0.0; 3]);
		assert_eq!(config.vertical_shift, 0.0);
		assert_eq!(config.orientation, Orientation::BottomUp);
		assert_eq!(config.output_dir, "Terrain Assets");
		assert_eq!(config.parameters(), GenerationParameters::default());
	}

	#[test]
	fn test_full_config() {
		let config = Config::parse(
			r#"
			name = "Canyon"
			mesh = "meshes/canyon.obj"
			resolution = 257
			padding = [4.0, 2.0, 4.0]
			vertical_shift = -0.25
			orientation = "top_down"
			output_dir = "out"
			"#,
		)
		.unwrap();

		let params = config.parameters();
		assert_eq!(params.resolution, 257);
		assert_eq!(params.padding, Vec3::new(4.0, 2.0, 4.0));
		assert_eq!(params.vertical_shift, -0.25);
		assert_eq!(params.orientation, OrientationMode::TopDown);
		assert_eq!(config.mesh, PathBuf::from("meshes/canyon.obj"));
	}

	#[test]
	fn test_rejects_invalid_values() {
		assert!(Config::parse("").is_err(), "mesh is required");
		assert!(Config::parse("mesh = \"a.obj\"\nresolution = 0").is_err());
		assert!(Config::parse("mesh = \"a.obj\"\nvertical_shift = 1.5").is_err());
		assert!(Config::parse("mesh = \"a.obj\"\norientation = \"sideways\"").is_err());
		assert!(Config::parse("mesh = \"a.obj\"\nname = \"  \"").is_err());
	}
}
