//! Terrain asset sink.
//!
//! Wraps a finished heightmap with the world size of the terrain it defines
//! and encodes it for terrain importers. Writing files is left to the caller.

use glam::Vec3;

use crate::error::GenerationError;
use crate::heightmap::Heightmap;
use crate::sampler::{generate_with, SampleOptions, SampleOutput};
use crate::surface::RaySurface;
use crate::types::GenerationParameters;

/// Name given to terrains generated without an explicit name.
pub const DEFAULT_TERRAIN_NAME: &str = "Generated Terrain";

/// Folder, relative to the project root, that terrain assets are saved in.
pub const TERRAIN_ASSET_DIR: &str = "Assets/Terrain Assets";

/// A heightmap ready to become a terrain resource.
#[derive(Clone, Debug)]
pub struct TerrainAsset {
  pub name: String,
  /// World size of the terrain: source bounds plus padding.
  pub size: Vec3,
  pub heightmap: Heightmap,
}

impl TerrainAsset {
  /// Build an asset from a completed generation pass.
  pub fn from_output(name: impl Into<String>, output: SampleOutput) -> Self {
    Self {
      name: name.into(),
      size: output.layout.padded_size,
      heightmap: output.heightmap,
    }
  }

  /// Project-relative path of the saved asset, e.g.
  /// `Assets/Terrain Assets/Generated Terrain.asset`.
  pub fn asset_path(&self) -> String {
    asset_path(&self.name)
  }

  /// Heights as 16-bit little-endian samples, row-major.
  ///
  /// This is the headerless RAW layout terrain importers accept with
  /// "16 bit, little endian" byte order.
  pub fn to_raw_u16_le(&self) -> Vec<u8> {
    self
      .heightmap
      .to_u16()
      .into_iter()
      .flat_map(u16::to_le_bytes)
      .collect()
  }
}

/// Project-relative asset path for a terrain named `name`.
pub fn asset_path(name: &str) -> String {
  format!("{}/{}.asset", TERRAIN_ASSET_DIR, name)
}

/// Sample `surface` on the rayon pool and wrap the result as a named asset.
pub fn generate_terrain<S: RaySurface + ?Sized>(
  surface: &S,
  params: &GenerationParameters,
  name: &str,
) -> Result<TerrainAsset, GenerationError> {
  let output = generate_with(surface, params, &SampleOptions::new().with_parallel(true))?;
  Ok(TerrainAsset::from_output(name, output))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::surfaces::BoxSurface;

  #[test]
  fn test_asset_path_convention() {
    assert_eq!(
      asset_path(DEFAULT_TERRAIN_NAME),
      "Assets/Terrain Assets/Generated Terrain.asset"
    );
  }

  #[test]
  fn test_terrain_size_is_padded_size() {
    let slab = BoxSurface::new(Vec3::ZERO, Vec3::new(10.0, 5.0, 10.0));
    let params = GenerationParameters::new()
      .with_resolution(8)
      .with_padding(Vec3::new(2.0, 5.0, 4.0));

    let asset = generate_terrain(&slab, &params, "Island").unwrap();

    assert_eq!(asset.name, "Island");
    assert_eq!(asset.size, Vec3::new(12.0, 10.0, 14.0));
    assert_eq!(asset.heightmap.resolution(), 8);
    assert_eq!(asset.asset_path(), "Assets/Terrain Assets/Island.asset");
  }

  #[test]
  fn test_raw_encoding_little_endian() {
    let heightmap = Heightmap::from_data(2, vec![0.0, 1.0, 0.5, 0.0]).unwrap();
    let asset = TerrainAsset {
      name: DEFAULT_TERRAIN_NAME.into(),
      size: Vec3::ONE,
      heightmap,
    };

    assert_eq!(
      asset.to_raw_u16_le(),
      vec![0x00, 0x00, 0xFF, 0xFF, 0x00, 0x80, 0x00, 0x00]
    );
  }
}
