//! mesh_terrain - Engine independent mesh to terrain heightmap conversion
//!
//! This crate turns any bounded, ray-queryable surface into a square grid of
//! normalized heights for a terrain asset. A regular grid of vertical rays is
//! cast over the surface's padded footprint; each hit height becomes one
//! heightmap cell.
//!
//! # Features
//!
//! - **Surface capability**: [`RaySurface`] abstracts bounds and ray queries,
//!   so triangle meshes, physics colliders or analytic shapes all work
//! - **Triangle mesh raycaster**: [`TriangleMesh`] with an XZ column grid for
//!   fast vertical rays
//! - **Padding and scaling**: per-axis padding, vertical shift, bottom-up or
//!   top-down height scaling
//! - **Parallel sampling**: rows distributed over rayon, with progress
//!   reporting and cooperative cancellation
//! - **Background jobs**: [`GenerationJobs`] for editors that poll each frame
//!
//! # Example
//!
//! ```ignore
//! use mesh_terrain::{generate_terrain, GenerationParameters, TriangleMesh};
//! use glam::Vec3;
//!
//! let mesh = TriangleMesh::new(positions, indices)?;
//! let params = GenerationParameters::new()
//!     .with_resolution(513)
//!     .with_padding(Vec3::new(20.0, 10.0, 20.0));
//!
//! let terrain = generate_terrain(&mesh, &params, "Generated Terrain")?;
//! std::fs::write("terrain.raw", terrain.to_raw_u16_le())?;
//! ```

pub mod error;
pub mod heightmap;
pub mod types;

pub use error::{GenerationError, MeshError};
pub use heightmap::Heightmap;
pub use types::{Bounds, GenerationParameters, OrientationMode, DEFAULT_RESOLUTION};

// Surface capability and backends
pub mod surface;
pub mod surfaces;
pub mod trimesh;
pub use surface::RaySurface;
pub use trimesh::TriangleMesh;

// Progress reporting and cancellation
pub mod progress;
pub use progress::{CancellationToken, NoProgress, ProgressSink, SharedProgress};

// Heightmap sampling
pub mod sampler;
pub use sampler::{generate, generate_with, SampleOptions, SampleOutput, SamplingLayout};

// Terrain asset sink
pub mod asset;
pub use asset::{generate_terrain, TerrainAsset, DEFAULT_TERRAIN_NAME};

// Auto-generation policy
pub mod policy;
pub use policy::{needs_generation, validate_terrain, SceneState, ValidationOutcome};

// Background generation jobs
pub mod jobs;
pub use jobs::{GenerationJobs, JobId};

// Engine-agnostic metrics
pub mod metrics;
