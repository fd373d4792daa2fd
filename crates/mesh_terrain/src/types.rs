//! Core data types for heightmap sampling.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  pub min: Vec3,
  pub max: Vec3,
}

impl Bounds {
  /// Create bounds with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec3::splat(f32::INFINITY),
      max: Vec3::splat(f32::NEG_INFINITY),
    }
  }

  /// Create bounds from min/max corners.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// Create bounds from a center point and full size.
  pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
    let half = size * 0.5;
    Self {
      min: center - half,
      max: center + half,
    }
  }

  /// Expand bounds to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Size of the box (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Center of the box.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }

  /// Same center, new size.
  pub fn with_size(&self, size: Vec3) -> Self {
    Self::from_center_size(self.center(), size)
  }

  /// Check if bounds are valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.cmple(self.max).all()
  }

  /// Check that both corners are finite.
  pub fn is_finite(&self) -> bool {
    self.min.is_finite() && self.max.is_finite()
  }

  /// Check if the box covers a point (boundary inclusive).
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    point.cmpge(self.min).all() && point.cmple(self.max).all()
  }
}

impl Default for Bounds {
  fn default() -> Self {
    Self::empty()
  }
}

/// How sampled heights are scaled when vertical padding is added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrientationMode {
  /// Heights are compressed by the ratio of source to padded vertical extent,
  /// keeping a 1:1 resemblance to the source object.
  #[default]
  BottomUp,

  /// Heights are not compensated for vertical padding, which stretches the
  /// terrain when `padding.y` is large.
  TopDown,
}

/// Parameters for a single generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParameters {
  /// Heightmap width and height in samples.
  pub resolution: u32,

  /// Extra space added to the source bounds on each axis.
  pub padding: Vec3,

  /// Offset added to every normalized height before clamping.
  /// Nominally in [-1, 1].
  pub vertical_shift: f32,

  /// Height scaling mode.
  pub orientation: OrientationMode,
}

/// Default heightmap resolution used by the terrain tooling.
pub const DEFAULT_RESOLUTION: u32 = 512;

impl Default for GenerationParameters {
  fn default() -> Self {
    Self {
      resolution: DEFAULT_RESOLUTION,
      padding: Vec3::ZERO,
      vertical_shift: 0.0,
      orientation: OrientationMode::default(),
    }
  }
}

impl GenerationParameters {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_resolution(mut self, resolution: u32) -> Self {
    self.resolution = resolution;
    self
  }

  pub fn with_padding(mut self, padding: Vec3) -> Self {
    self.padding = padding;
    self
  }

  /// Set the vertical shift, clamped to [-1, 1].
  pub fn with_vertical_shift(mut self, shift: f32) -> Self {
    self.vertical_shift = shift.clamp(-1.0, 1.0);
    self
  }

  pub fn with_orientation(mut self, orientation: OrientationMode) -> Self {
    self.orientation = orientation;
    self
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
