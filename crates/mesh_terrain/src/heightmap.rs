//! Square grid of normalized terrain heights.

/// Normalized heights in [0, 1], `resolution × resolution` cells.
///
/// Indexed `[row][col]` where rows advance along world Z and columns along
/// world X. Storage is row-major: `index = row * resolution + col`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
  resolution: u32,
  data: Vec<f32>,
}

impl Heightmap {
  /// Create a zero-filled heightmap.
  pub fn new(resolution: u32) -> Self {
    let len = resolution as usize * resolution as usize;
    Self {
      resolution,
      data: vec![0.0; len],
    }
  }

  /// Wrap an existing row-major buffer.
  ///
  /// Returns `None` if the buffer length is not `resolution²`.
  pub fn from_data(resolution: u32, data: Vec<f32>) -> Option<Self> {
    (data.len() == resolution as usize * resolution as usize).then_some(Self { resolution, data })
  }

  /// Width and height in cells.
  #[inline]
  pub fn resolution(&self) -> u32 {
    self.resolution
  }

  /// Total number of cells.
  #[inline]
  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  #[inline]
  fn index(&self, row: u32, col: u32) -> usize {
    row as usize * self.resolution as usize + col as usize
  }

  /// Height at `[row][col]`, or `None` when out of range.
  pub fn get(&self, row: u32, col: u32) -> Option<f32> {
    if row < self.resolution && col < self.resolution {
      Some(self.data[self.index(row, col)])
    } else {
      None
    }
  }

  /// Set the height at `[row][col]`.
  ///
  /// # Panics
  /// Panics if `row` or `col` is out of range.
  pub fn set(&mut self, row: u32, col: u32, height: f32) {
    assert!(row < self.resolution && col < self.resolution, "cell out of range");
    let idx = self.index(row, col);
    self.data[idx] = height;
  }

  /// One row (constant Z) of heights, or `None` if `row` is out of range.
  pub fn row(&self, row: u32) -> Option<&[f32]> {
    if row >= self.resolution {
      return None;
    }
    let start = self.index(row, 0);
    Some(&self.data[start..start + self.resolution as usize])
  }

  /// Iterate over rows in order.
  pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
    // chunks(0) panics; an empty map simply yields nothing
    self.data.chunks(self.resolution.max(1) as usize)
  }

  /// Row-major cell buffer.
  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
    &mut self.data
  }

  /// Minimum and maximum height, or `None` for an empty map.
  pub fn min_max(&self) -> Option<(f32, f32)> {
    let mut iter = self.data.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
  }

  /// Heights quantized to 16 bits (`round(h * 65535)`), row-major.
  pub fn to_u16(&self) -> Vec<u16> {
    self
      .data
      .iter()
      .map(|&h| (h.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16)
      .collect()
  }
}
