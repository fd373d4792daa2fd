//! Error types for heightmap generation.

use thiserror::Error;

/// Failure of a generation call. No partial heightmap is produced.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
  /// Parameters cannot produce a well-defined heightmap.
  #[error("invalid generation parameters: {0}")]
  InvalidParameters(String),

  /// The surface has no usable geometry.
  #[error("missing surface: {0}")]
  MissingSurface(String),

  /// A cancellation token was triggered before all rows were sampled.
  #[error("generation cancelled after {rows_completed} of {total_rows} rows")]
  Cancelled { rows_completed: u32, total_rows: u32 },
}

/// Failure to build a [`crate::TriangleMesh`] from raw buffers.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MeshError {
  #[error("index count {0} is not a multiple of 3")]
  IndexCountNotTriangles(usize),

  #[error("index {index} out of range for {vertex_count} vertices")]
  IndexOutOfRange { index: u32, vertex_count: usize },

  #[error("position buffer length {0} is not a multiple of 3")]
  PositionCountNotVectors(usize),

  #[error("vertex {0} has a non-finite coordinate")]
  NonFiniteVertex(usize),

  #[error("mesh has no triangles")]
  Empty,
}
