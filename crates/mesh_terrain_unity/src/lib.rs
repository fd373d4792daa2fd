//! Unity FFI bridge for mesh_terrain.
//!
//! The C# editor window uploads the source mesh once, then either generates
//! synchronously or starts a background job and polls it from
//! `EditorApplication.update`. Key features:
//! - Mesh handles owned by Rust, destroyed explicitly by C# (replaces the
//!   temporary MeshCollider the editor used to add and remove)
//! - Heightmap buffers retained by Rust so returned pointers stay valid
//! - Background jobs with progress and cancellation
//! - Engine-agnostic metrics collection via `metrics` feature
//!
//! # Architecture
//!
//! ```text
//! C# (Unity Editor)                    Rust (mesh_terrain_unity)
//! ┌────────────────────┐               ┌──────────────────────────┐
//! │ MeshToTerrain      │  terrain_     │ MeshState                │
//! │   mesh.vertices ───┼─mesh_create─► │  - mesh: TriangleMesh    │
//! │                    │               │  - retained: Heightmap   │
//! │ Generate():        │  terrain_     │                          │
//! │   params ──────────┼─generate()──► │ generate_with(parallel)  │
//! │                    │ ◄─────────────│  heights (R × R f32)     │
//! │ TerrainData        │  FfiHeightmap │                          │
//! │   .SetHeights()    │               │                          │
//! └────────────────────┘               └──────────────────────────┘
//! ```
//!
//! # Status codes
//!
//! - `0` success
//! - `-1` null pointer
//! - `-2` failed to acquire lock
//! - `-3` unknown mesh or job id
//! - `-4` invalid parameters or malformed mesh
//! - `-5` surface has no usable bounds
//! - `-6` generation was cancelled

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use glam::Vec3;

use mesh_terrain::{
    metrics::GenerationMetrics, needs_generation, GenerationError, GenerationJobs,
    GenerationParameters, Heightmap, JobId, OrientationMode, SampleOptions, SampleOutput,
    SceneState, TriangleMesh,
};

pub const STATUS_OK: i32 = 0;
pub const STATUS_NULL_POINTER: i32 = -1;
pub const STATUS_LOCK_FAILED: i32 = -2;
pub const STATUS_UNKNOWN_ID: i32 = -3;
pub const STATUS_INVALID: i32 = -4;
pub const STATUS_MISSING_SURFACE: i32 = -5;
pub const STATUS_CANCELLED: i32 = -6;

// =============================================================================
// FFI Types
// =============================================================================

/// Generation parameters. Matches C# FfiGenerationParams exactly.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct FfiGenerationParams {
    /// Heightmap samples per side.
    pub resolution: u32,
    /// 0 = BottomUp, 1 = TopDown.
    pub orientation: u32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub padding_z: f32,
    /// Clamped to [-1, 1].
    pub vertical_shift: f32,
}

impl FfiGenerationParams {
    fn to_parameters(self) -> Option<GenerationParameters> {
        let orientation = match self.orientation {
            0 => OrientationMode::BottomUp,
            1 => OrientationMode::TopDown,
            _ => return None,
        };
        Some(
            GenerationParameters::new()
                .with_resolution(self.resolution)
                .with_padding(Vec3::new(self.padding_x, self.padding_y, self.padding_z))
                .with_vertical_shift(self.vertical_shift)
                .with_orientation(orientation),
        )
    }
}

/// Heightmap view returned to C#.
///
/// `heights` points at `resolution * resolution` row-major floats owned by
/// Rust. Row index maps to terrain Z, column index to terrain X.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct FfiHeightmap {
    pub heights: *const f32,
    pub resolution: u32,
    pub _pad: u32,
    /// World size for TerrainData.size (source bounds plus padding).
    pub size_x: f32,
    pub size_y: f32,
    pub size_z: f32,
    pub _pad2: u32,
    /// Rays that hit the mesh.
    pub hit_count: u64,
}

impl FfiHeightmap {
    pub const EMPTY: Self = Self {
        heights: std::ptr::null(),
        resolution: 0,
        _pad: 0,
        size_x: 0.0,
        size_y: 0.0,
        size_z: 0.0,
        _pad2: 0,
        hit_count: 0,
    };
}

/// Timing statistics for FFI export.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct FfiTimingStats {
    pub last_us: u64,
    pub avg_us: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub sample_count: u32,
    pub _pad: u32,
}

/// Metrics snapshot for FFI export.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct FfiMetricsSnapshot {
    pub generation: FfiTimingStats,
    pub total_generations: u64,
    pub total_rays: u64,
    pub total_hits: u64,
    pub total_cancelled: u64,
    pub total_failed: u64,
}

// =============================================================================
// Retained State
// =============================================================================

/// Finished heightmap kept alive for the pointer handed to C#.
struct RetainedHeightmap {
    heightmap: Heightmap,
    size: Vec3,
    hit_count: u64,
}

impl RetainedHeightmap {
    fn from_output(output: SampleOutput) -> Self {
        Self {
            size: output.layout.padded_size,
            hit_count: output.hit_count,
            heightmap: output.heightmap,
        }
    }

    fn to_ffi(&self) -> FfiHeightmap {
        FfiHeightmap {
            heights: self.heightmap.as_slice().as_ptr(),
            resolution: self.heightmap.resolution(),
            _pad: 0,
            size_x: self.size.x,
            size_y: self.size.y,
            size_z: self.size.z,
            _pad2: 0,
            hit_count: self.hit_count,
        }
    }
}

struct MeshState {
    mesh: Arc<TriangleMesh>,
    /// Output of the last synchronous generation.
    retained: Option<RetainedHeightmap>,
}

enum JobState {
    Running(JobId),
    Finished(Result<RetainedHeightmap, i32>),
}

/// Global mesh storage with thread-safe access.
static MESHES: Mutex<Option<HashMap<i32, MeshState>>> = Mutex::new(None);
static NEXT_MESH_ID: AtomicI32 = AtomicI32::new(1);

/// Global job storage. Job ids are separate from mesh ids.
static JOBS: Mutex<Option<HashMap<i32, JobState>>> = Mutex::new(None);
static NEXT_JOB_ID: AtomicI32 = AtomicI32::new(1);
static GENERATION_JOBS: Mutex<Option<GenerationJobs>> = Mutex::new(None);

static METRICS: Mutex<Option<GenerationMetrics>> = Mutex::new(None);

fn status_for(err: &GenerationError) -> i32 {
    match err {
        GenerationError::InvalidParameters(_) => STATUS_INVALID,
        GenerationError::MissingSurface(_) => STATUS_MISSING_SURFACE,
        GenerationError::Cancelled { .. } => STATUS_CANCELLED,
    }
}

fn with_metrics(f: impl FnOnce(&mut GenerationMetrics)) {
    if let Ok(mut guard) = METRICS.lock() {
        f(guard.get_or_insert_with(GenerationMetrics::new));
    }
}

fn record_result(result: &Result<SampleOutput, GenerationError>) {
    with_metrics(|metrics| match result {
        Ok(output) => metrics.record_generation(output),
        Err(GenerationError::Cancelled { .. }) => metrics.record_cancelled(),
        Err(_) => metrics.record_failed(),
    });
}

fn generation_jobs() -> Option<GenerationJobs> {
    let mut guard = GENERATION_JOBS.lock().ok()?;
    Some(guard.get_or_insert_with(GenerationJobs::new).clone())
}

// =============================================================================
// FFI Functions - Meshes
// =============================================================================

/// Returns the library version as a packed u32: 0xMMmmpp (major.minor.patch).
#[no_mangle]
pub extern "C" fn terrain_version() -> u32 {
    0x000100 // v0.1.0
}

/// Upload a world-space triangle mesh.
///
/// # Safety
/// - `positions` must point to `vertex_count * 3` floats (x, y, z per vertex).
/// - `indices` must point to `index_count` indices, three per triangle.
///
/// # Returns
/// - Positive mesh_id on success
/// - -1 if a pointer is null
/// - -2 if failed to acquire lock
/// - -4 if the mesh is malformed
#[no_mangle]
pub unsafe extern "C" fn terrain_mesh_create(
    positions: *const f32,
    vertex_count: u32,
    indices: *const u32,
    index_count: u32,
) -> i32 {
    if positions.is_null() || indices.is_null() {
        return STATUS_NULL_POINTER;
    }

    let positions = std::slice::from_raw_parts(positions, vertex_count as usize * 3);
    let indices = std::slice::from_raw_parts(indices, index_count as usize);
    let Ok(mesh) = TriangleMesh::from_flat(positions, indices) else {
        return STATUS_INVALID;
    };

    let Ok(mut guard) = MESHES.lock() else {
        return STATUS_LOCK_FAILED;
    };

    let mesh_id = NEXT_MESH_ID.fetch_add(1, Ordering::SeqCst);
    guard.get_or_insert_with(HashMap::new).insert(
        mesh_id,
        MeshState {
            mesh: Arc::new(mesh),
            retained: None,
        },
    );

    mesh_id
}

/// Destroy a mesh and free its retained heightmap.
///
/// Jobs already started on the mesh keep running to completion.
///
/// # Returns
/// - 0 on success
/// - -2 if failed to acquire lock
/// - -3 if mesh_id not found
#[no_mangle]
pub extern "C" fn terrain_mesh_destroy(mesh_id: i32) -> i32 {
    let Ok(mut guard) = MESHES.lock() else {
        return STATUS_LOCK_FAILED;
    };

    let Some(ref mut meshes) = *guard else {
        return STATUS_UNKNOWN_ID;
    };

    if meshes.remove(&mesh_id).is_some() {
        STATUS_OK
    } else {
        STATUS_UNKNOWN_ID
    }
}

fn mesh_handle(mesh_id: i32) -> Result<Arc<TriangleMesh>, i32> {
    let guard = MESHES.lock().map_err(|_| STATUS_LOCK_FAILED)?;
    guard
        .as_ref()
        .and_then(|meshes| meshes.get(&mesh_id))
        .map(|state| Arc::clone(&state.mesh))
        .ok_or(STATUS_UNKNOWN_ID)
}

// =============================================================================
// FFI Functions - Generation
// =============================================================================

/// Generate a heightmap synchronously, sampling rows in parallel.
///
/// # Safety
/// - `params` must point to a valid FfiGenerationParams struct.
/// - `out` must point to a valid FfiHeightmap struct.
///
/// `out.heights` stays valid until the next generate call on this mesh or
/// until the mesh is destroyed.
///
/// # Returns
/// - 0 on success
/// - -1 if a pointer is null
/// - -2 if failed to acquire lock
/// - -3 if mesh_id not found (or destroyed during generation)
/// - -4 if parameters are invalid
/// - -5 if the mesh has no usable bounds
#[no_mangle]
pub unsafe extern "C" fn terrain_generate(
    mesh_id: i32,
    params: *const FfiGenerationParams,
    out: *mut FfiHeightmap,
) -> i32 {
    if params.is_null() || out.is_null() {
        return STATUS_NULL_POINTER;
    }
    (*out) = FfiHeightmap::EMPTY;

    let Some(parameters) = (*params).to_parameters() else {
        return STATUS_INVALID;
    };

    let mesh = match mesh_handle(mesh_id) {
        Ok(mesh) => mesh,
        Err(status) => return status,
    };

    // Lock released while sampling so other meshes stay usable
    let result = mesh_terrain::generate_with(
        mesh.as_ref(),
        &parameters,
        &SampleOptions::new().with_parallel(true),
    );
    record_result(&result);

    let output = match result {
        Ok(output) => output,
        Err(err) => return status_for(&err),
    };

    let Ok(mut guard) = MESHES.lock() else {
        return STATUS_LOCK_FAILED;
    };
    let Some(state) = guard.as_mut().and_then(|meshes| meshes.get_mut(&mesh_id)) else {
        return STATUS_UNKNOWN_ID;
    };

    let retained = state.retained.insert(RetainedHeightmap::from_output(output));
    (*out) = retained.to_ffi();

    STATUS_OK
}

// =============================================================================
// FFI Functions - Background Jobs
// =============================================================================

/// Start generating in the background.
///
/// # Safety
/// - `params` must point to a valid FfiGenerationParams struct.
///
/// # Returns
/// - Positive job_id on success
/// - -1 if params is null
/// - -2 if failed to acquire lock
/// - -3 if mesh_id not found
/// - -4 if orientation is unknown
///
/// Other parameter errors are reported by `terrain_job_poll`.
#[no_mangle]
pub unsafe extern "C" fn terrain_job_start(
    mesh_id: i32,
    params: *const FfiGenerationParams,
) -> i32 {
    if params.is_null() {
        return STATUS_NULL_POINTER;
    }

    let Some(parameters) = (*params).to_parameters() else {
        return STATUS_INVALID;
    };

    let mesh = match mesh_handle(mesh_id) {
        Ok(mesh) => mesh,
        Err(status) => return status,
    };

    let Some(generation_jobs) = generation_jobs() else {
        return STATUS_LOCK_FAILED;
    };
    let Ok(mut guard) = JOBS.lock() else {
        return STATUS_LOCK_FAILED;
    };

    let job = generation_jobs.spawn(mesh, parameters);
    let job_id = NEXT_JOB_ID.fetch_add(1, Ordering::SeqCst);
    guard
        .get_or_insert_with(HashMap::new)
        .insert(job_id, JobState::Running(job));

    job_id
}

/// Fraction of rows sampled, in [0, 1].
///
/// # Returns
/// - Progress on success (1.0 once finished)
/// - -2.0 if failed to acquire lock
/// - -3.0 if job_id not found
#[no_mangle]
pub extern "C" fn terrain_job_progress(job_id: i32) -> f32 {
    let Ok(guard) = JOBS.lock() else {
        return STATUS_LOCK_FAILED as f32;
    };

    match guard.as_ref().and_then(|jobs| jobs.get(&job_id)) {
        Some(JobState::Running(job)) => generation_jobs()
            .and_then(|jobs| jobs.progress(*job))
            .unwrap_or(0.0),
        Some(JobState::Finished(_)) => 1.0,
        None => STATUS_UNKNOWN_ID as f32,
    }
}

/// Request cancellation of a running job.
///
/// The job finishes with -6 on its next poll.
///
/// # Returns
/// - 0 if cancellation was requested
/// - -2 if failed to acquire lock
/// - -3 if job_id not found or already finished
#[no_mangle]
pub extern "C" fn terrain_job_cancel(job_id: i32) -> i32 {
    let Ok(guard) = JOBS.lock() else {
        return STATUS_LOCK_FAILED;
    };

    let Some(JobState::Running(job)) = guard.as_ref().and_then(|jobs| jobs.get(&job_id)) else {
        return STATUS_UNKNOWN_ID;
    };

    match generation_jobs() {
        Some(jobs) if jobs.cancel(*job) => STATUS_OK,
        Some(_) => STATUS_UNKNOWN_ID,
        None => STATUS_LOCK_FAILED,
    }
}

/// Poll a background job.
///
/// # Safety
/// - `out` must point to a valid FfiHeightmap struct.
///
/// `out.heights` stays valid until `terrain_job_release`. A finished job
/// keeps answering with the same result until released.
///
/// # Returns
/// - 0 if the job is still running
/// - 1 if finished (out is filled)
/// - -1 if out is null
/// - -2 if failed to acquire lock
/// - -3 if job_id not found
/// - -4, -5, -6 if the job failed (see status codes)
#[no_mangle]
pub unsafe extern "C" fn terrain_job_poll(job_id: i32, out: *mut FfiHeightmap) -> i32 {
    if out.is_null() {
        return STATUS_NULL_POINTER;
    }
    (*out) = FfiHeightmap::EMPTY;

    let Ok(mut guard) = JOBS.lock() else {
        return STATUS_LOCK_FAILED;
    };
    let Some(state) = guard.as_mut().and_then(|jobs| jobs.get_mut(&job_id)) else {
        return STATUS_UNKNOWN_ID;
    };

    if let JobState::Running(job) = *state {
        let Some(generation_jobs) = generation_jobs() else {
            return STATUS_LOCK_FAILED;
        };
        let Some(result) = generation_jobs.poll(job) else {
            return 0;
        };

        record_result(&result);
        *state = JobState::Finished(
            result
                .map(RetainedHeightmap::from_output)
                .map_err(|err| status_for(&err)),
        );
    }

    match state {
        JobState::Finished(Ok(retained)) => {
            (*out) = retained.to_ffi();
            1
        }
        JobState::Finished(Err(status)) => *status,
        JobState::Running(_) => 0,
    }
}

/// Forget a job and free its heightmap. A running job is cancelled first.
///
/// # Returns
/// - 0 on success
/// - -2 if failed to acquire lock
/// - -3 if job_id not found
#[no_mangle]
pub extern "C" fn terrain_job_release(job_id: i32) -> i32 {
    let Ok(mut guard) = JOBS.lock() else {
        return STATUS_LOCK_FAILED;
    };

    match guard.as_mut().and_then(|jobs| jobs.remove(&job_id)) {
        Some(JobState::Running(job)) => {
            if let Some(jobs) = generation_jobs() {
                jobs.forget(job);
            }
            STATUS_OK
        }
        Some(JobState::Finished(_)) => STATUS_OK,
        None => STATUS_UNKNOWN_ID,
    }
}

// =============================================================================
// FFI Functions - Policy & Metrics
// =============================================================================

/// Whether a scene without an active terrain should get one generated.
///
/// Returns 1 if generation is needed, 0 otherwise.
#[no_mangle]
pub extern "C" fn terrain_needs_generation(has_active_terrain: u8) -> u8 {
    let scene = SceneState {
        has_active_terrain: has_active_terrain != 0,
        has_terrain_preview: false,
    };
    needs_generation(&scene) as u8
}

/// Get the metrics snapshot accumulated over all generations.
///
/// # Safety
/// - `out` must point to a valid FfiMetricsSnapshot struct.
///
/// # Returns
/// - 0 on success
/// - -1 if out is null
/// - -2 if failed to acquire lock
/// - -4 if metrics feature not enabled (compile-time)
#[no_mangle]
pub unsafe extern "C" fn terrain_get_metrics(out: *mut FfiMetricsSnapshot) -> i32 {
    #[cfg(not(feature = "metrics"))]
    {
        let _ = out;
        return STATUS_INVALID; // Metrics not enabled
    }

    #[cfg(feature = "metrics")]
    {
        if out.is_null() {
            return STATUS_NULL_POINTER;
        }

        let Ok(mut guard) = METRICS.lock() else {
            return STATUS_LOCK_FAILED;
        };
        let snapshot = guard.get_or_insert_with(GenerationMetrics::new).snapshot();

        (*out) = FfiMetricsSnapshot {
            generation: FfiTimingStats {
                last_us: snapshot.generation.last_us,
                avg_us: snapshot.generation.avg_us,
                min_us: snapshot.generation.min_us,
                max_us: snapshot.generation.max_us,
                sample_count: snapshot.generation.sample_count,
                _pad: 0,
            },
            total_generations: snapshot.total_generations,
            total_rays: snapshot.total_rays,
            total_hits: snapshot.total_hits,
            total_cancelled: snapshot.total_cancelled,
            total_failed: snapshot.total_failed,
        };

        STATUS_OK
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod lib_test;
