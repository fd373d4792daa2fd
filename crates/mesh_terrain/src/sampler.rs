//! Heightmap sampling by vertical ray casts.
//!
//! The padded footprint of the surface is covered by a `resolution²` grid.
//! For every cell a ray is cast straight down from above the surface; the hit
//! height, normalized against the source bounds, becomes the cell value.
//!
//! # Height scaling
//!
//! With vertical padding the terrain is taller than the source. In
//! [`OrientationMode::BottomUp`] heights are multiplied by
//! `size_factor = source.y / (source.y + padding.y)` so the terrain keeps the
//! proportions of the source. [`OrientationMode::TopDown`] leaves heights
//! unscaled, stretching the result when `padding.y > 0`.
//!
//! # Example
//!
//! ```ignore
//! use mesh_terrain::{generate, surfaces::BoxSurface, GenerationParameters};
//! use glam::Vec3;
//!
//! let slab = BoxSurface::new(Vec3::ZERO, Vec3::new(10.0, 5.0, 10.0));
//! let params = GenerationParameters::new().with_resolution(4);
//! let heightmap = generate(&slab, &params)?;
//! assert!(heightmap.as_slice().iter().all(|&h| h == 1.0));
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::error::GenerationError;
use crate::heightmap::Heightmap;
use crate::progress::{CancellationToken, ProgressSink};
use crate::surface::RaySurface;
use crate::types::{Bounds, GenerationParameters, OrientationMode};

/// Ray length in multiples of the source height.
const RAY_LENGTH_FACTOR: f32 = 3.0;

// =============================================================================
// Sampling layout
// =============================================================================

/// Validated geometry of one generation pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingLayout {
  /// Bounding box reported by the surface.
  pub source_bounds: Bounds,
  /// Sampling area: padded X/Z extent around the source center, source Y extent.
  pub sampling_bounds: Bounds,
  /// `source_bounds.size() + padding`. World size of the resulting terrain.
  pub padded_size: Vec3,
  /// Ratio of source to padded vertical extent (1.0 without vertical padding).
  pub size_factor: f32,
  /// World distance between adjacent samples on X and Z.
  pub step: Vec2,
  /// Samples per axis.
  pub resolution: u32,
}

impl SamplingLayout {
  /// Validate inputs and derive the sampling grid.
  ///
  /// Fails before any ray is cast if the bounds are unusable or the
  /// parameters would divide by zero.
  pub fn new(source_bounds: Bounds, params: &GenerationParameters) -> Result<Self, GenerationError> {
    if !source_bounds.is_finite() || !source_bounds.is_valid() {
      return Err(GenerationError::MissingSurface(
        "bounding box is empty or non-finite".into(),
      ));
    }

    let source_size = source_bounds.size();
    if source_size.cmple(Vec3::ZERO).any() {
      return Err(GenerationError::MissingSurface(format!(
        "bounding box {}x{}x{} has no volume",
        source_size.x, source_size.y, source_size.z
      )));
    }

    if params.resolution == 0 {
      return Err(GenerationError::InvalidParameters(
        "resolution must be positive".into(),
      ));
    }

    if !params.padding.is_finite() || !params.vertical_shift.is_finite() {
      return Err(GenerationError::InvalidParameters(
        "padding and vertical shift must be finite".into(),
      ));
    }

    let padded_size = source_size + params.padding;
    if padded_size.y <= 0.0 {
      return Err(GenerationError::InvalidParameters(format!(
        "padded vertical extent {} must be positive",
        padded_size.y
      )));
    }
    if padded_size.x <= 0.0 || padded_size.z <= 0.0 {
      return Err(GenerationError::InvalidParameters(format!(
        "padded footprint {}x{} must be positive",
        padded_size.x, padded_size.z
      )));
    }

    let sampling_bounds =
      source_bounds.with_size(Vec3::new(padded_size.x, source_size.y, padded_size.z));
    let resolution_f = params.resolution as f32;

    Ok(Self {
      source_bounds,
      sampling_bounds,
      padded_size,
      size_factor: source_size.y / padded_size.y,
      step: Vec2::new(padded_size.x / resolution_f, padded_size.z / resolution_f),
      resolution: params.resolution,
    })
  }

  /// Start point of the ray for `[row][col]`, well above the sampling bounds.
  #[inline]
  pub fn ray_origin(&self, row: u32, col: u32) -> Vec3 {
    let min = self.sampling_bounds.min;
    Vec3::new(
      min.x + col as f32 * self.step.x,
      self.sampling_bounds.max.y + self.sampling_bounds.size().y,
      min.z + row as f32 * self.step.y,
    )
  }

  /// Maximum ray distance; reaches below the bottom of the source bounds.
  #[inline]
  pub fn ray_length(&self) -> f32 {
    self.source_bounds.size().y * RAY_LENGTH_FACTOR
  }

  /// Total number of rays in one pass.
  pub fn ray_count(&self) -> u64 {
    self.resolution as u64 * self.resolution as u64
  }

  /// Convert a hit height to a normalized, shifted, scaled and clamped value.
  #[inline]
  pub fn normalize_hit(&self, hit_y: f32, params: &GenerationParameters) -> f32 {
    let mut height = (hit_y - self.source_bounds.min.y) / self.source_bounds.size().y;
    height += params.vertical_shift;

    if params.orientation == OrientationMode::BottomUp {
      height *= self.size_factor;
    }

    // Terrain heights are normalized
    height.clamp(0.0, 1.0)
  }
}

// =============================================================================
// Options and output
// =============================================================================

/// Optional collaborators for a generation pass.
#[derive(Clone, Copy, Default)]
pub struct SampleOptions<'a> {
  /// Receives `(rows_done, total_rows)` once per row.
  pub progress: Option<&'a dyn ProgressSink>,
  /// Checked before each row.
  pub cancel: Option<&'a CancellationToken>,
  /// Distribute rows over the rayon pool.
  pub parallel: bool,
}

impl<'a> SampleOptions<'a> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
    self.progress = Some(progress);
    self
  }

  pub fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
    self.cancel = Some(cancel);
    self
  }

  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }

  #[inline]
  fn is_cancelled(&self) -> bool {
    self.cancel.is_some_and(CancellationToken::is_cancelled)
  }

  #[inline]
  fn report(&self, current: u32, total: u32) {
    if let Some(progress) = self.progress {
      progress.report(current, total);
    }
  }
}

/// Result of a completed generation pass.
#[derive(Clone, Debug)]
pub struct SampleOutput {
  pub heightmap: Heightmap,
  pub layout: SamplingLayout,
  /// Number of rays that hit the surface.
  pub hit_count: u64,
  /// Wall time spent sampling, in microseconds.
  pub elapsed_us: u64,
}

impl SampleOutput {
  /// Number of rays that missed (cells left at ground level).
  pub fn miss_count(&self) -> u64 {
    self.layout.ray_count() - self.hit_count
  }
}

// =============================================================================
// Generation
// =============================================================================

/// Sample `surface` into a heightmap on the calling thread.
pub fn generate<S: RaySurface + ?Sized>(
  surface: &S,
  params: &GenerationParameters,
) -> Result<Heightmap, GenerationError> {
  generate_with(surface, params, &SampleOptions::default()).map(|output| output.heightmap)
}

/// Sample `surface` with progress reporting, cancellation and optional
/// row-parallel execution.
///
/// Sequential and parallel passes produce bit-identical heightmaps.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "sampler::generate_with"))]
pub fn generate_with<S: RaySurface + ?Sized>(
  surface: &S,
  params: &GenerationParameters,
  options: &SampleOptions<'_>,
) -> Result<SampleOutput, GenerationError> {
  let layout = SamplingLayout::new(surface.bounding_box(), params)?;
  let start = web_time::Instant::now();

  let mut heightmap = Heightmap::new(layout.resolution);
  let hit_count = if options.parallel {
    sample_rows_parallel(surface, &layout, params, options, &mut heightmap)?
  } else {
    sample_rows_sequential(surface, &layout, params, options, &mut heightmap)?
  };

  Ok(SampleOutput {
    heightmap,
    layout,
    hit_count,
    elapsed_us: start.elapsed().as_micros() as u64,
  })
}

fn sample_rows_sequential<S: RaySurface + ?Sized>(
  surface: &S,
  layout: &SamplingLayout,
  params: &GenerationParameters,
  options: &SampleOptions<'_>,
  heightmap: &mut Heightmap,
) -> Result<u64, GenerationError> {
  #[cfg(feature = "tracing")]
  let _span = tracing::info_span!("sample_rows_sequential").entered();

  let total = layout.resolution;
  let mut hits = 0u64;

  for (row, cells) in heightmap.as_mut_slice().chunks_mut(total as usize).enumerate() {
    let row = row as u32;
    if options.is_cancelled() {
      return Err(GenerationError::Cancelled {
        rows_completed: row,
        total_rows: total,
      });
    }
    hits += sample_row(surface, layout, params, row, cells);
    options.report(row + 1, total);
  }

  Ok(hits)
}

fn sample_rows_parallel<S: RaySurface + ?Sized>(
  surface: &S,
  layout: &SamplingLayout,
  params: &GenerationParameters,
  options: &SampleOptions<'_>,
  heightmap: &mut Heightmap,
) -> Result<u64, GenerationError> {
  #[cfg(feature = "tracing")]
  let _span = tracing::info_span!("sample_rows_parallel").entered();

  let total = layout.resolution;
  let rows_done = AtomicU32::new(0);
  let hits = AtomicU64::new(0);

  heightmap
    .as_mut_slice()
    .par_chunks_mut(total as usize)
    .enumerate()
    .for_each(|(row, cells)| {
      if options.is_cancelled() {
        return;
      }
      let row_hits = sample_row(surface, layout, params, row as u32, cells);
      hits.fetch_add(row_hits, Ordering::Relaxed);
      let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
      options.report(done, total);
    });

  let rows_completed = rows_done.into_inner();
  if rows_completed < total {
    return Err(GenerationError::Cancelled {
      rows_completed,
      total_rows: total,
    });
  }

  Ok(hits.into_inner())
}

/// Fill one row of cells. Returns the number of hits.
#[inline]
fn sample_row<S: RaySurface + ?Sized>(
  surface: &S,
  layout: &SamplingLayout,
  params: &GenerationParameters,
  row: u32,
  cells: &mut [f32],
) -> u64 {
  let max_distance = layout.ray_length();
  let mut hits = 0;

  for (col, cell) in cells.iter_mut().enumerate() {
    let origin = layout.ray_origin(row, col as u32);
    *cell = match surface.cast_ray(origin, Vec3::NEG_Y, max_distance) {
      Some(hit) => {
        hits += 1;
        layout.normalize_hit(hit.y, params)
      }
      // Nothing below this cell: ground level
      None => 0.0,
    };
  }

  hits
}

#[cfg(test)]
#[path = "sampler_test.rs"]
mod sampler_test;
