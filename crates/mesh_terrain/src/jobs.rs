//! Background heightmap generation on the rayon pool.
//!
//! Large resolutions mean millions of ray casts, so editors queue generation
//! off the UI thread and poll for progress each frame:
//!
//! ```ignore
//! let jobs = GenerationJobs::new();
//! let job = jobs.spawn(Arc::new(mesh), params);
//!
//! // Each frame
//! show_progress(jobs.progress(job).unwrap_or(1.0));
//! if let Some(result) = jobs.poll(job) {
//!     // Use result
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::GenerationError;
use crate::progress::{CancellationToken, SharedProgress};
use crate::sampler::{generate_with, SampleOptions, SampleOutput};
use crate::surface::RaySurface;
use crate::types::GenerationParameters;

/// Unique identifier for a spawned generation job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl JobId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }
}

/// Outcome of a finished job.
pub type JobResult = Result<SampleOutput, GenerationError>;

/// Shared handles for a job still running.
struct RunningJob {
  progress: Arc<SharedProgress>,
  cancel: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  // Job tables stay consistent even if a holder panicked
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Queue of generation jobs with result polling.
///
/// Clones share the same job tables.
#[derive(Clone, Default)]
pub struct GenerationJobs {
  /// Completed results waiting to be polled.
  results: Arc<Mutex<HashMap<JobId, JobResult>>>,
  /// Jobs queued or running.
  running: Arc<Mutex<HashMap<JobId, RunningJob>>>,
}

impl GenerationJobs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start sampling `surface` on rayon's pool (non-blocking).
  ///
  /// Rows are sampled in parallel within the job.
  pub fn spawn<S>(&self, surface: Arc<S>, params: GenerationParameters) -> JobId
  where
    S: RaySurface + ?Sized + 'static,
  {
    let job_id = JobId::next();
    let progress = Arc::new(SharedProgress::new());
    let cancel = CancellationToken::new();

    lock(&self.running).insert(
      job_id,
      RunningJob {
        progress: Arc::clone(&progress),
        cancel: cancel.clone(),
      },
    );

    let results = Arc::clone(&self.results);
    let running = Arc::clone(&self.running);

    rayon::spawn(move || {
      let options = SampleOptions::new()
        .with_progress(progress.as_ref())
        .with_cancellation(&cancel)
        .with_parallel(true);
      let result = generate_with(surface.as_ref(), &params, &options);

      // Forgotten jobs are no longer in the running table; drop their result
      let mut running = lock(&running);
      if running.remove(&job_id).is_some() {
        lock(&results).insert(job_id, result);
      }
    });

    job_id
  }

  /// Take a finished job's result (non-blocking).
  ///
  /// Returns `None` while the job runs, or if the id is unknown or was
  /// already consumed.
  pub fn poll(&self, job_id: JobId) -> Option<JobResult> {
    lock(&self.results).remove(&job_id)
  }

  /// Fraction of rows sampled, `Some(1.0)` once the result is ready.
  pub fn progress(&self, job_id: JobId) -> Option<f32> {
    if let Some(job) = lock(&self.running).get(&job_id) {
      return Some(job.progress.fraction());
    }
    lock(&self.results).contains_key(&job_id).then_some(1.0)
  }

  /// Request cancellation. Returns false if the job is not running.
  pub fn cancel(&self, job_id: JobId) -> bool {
    match lock(&self.running).get(&job_id) {
      Some(job) => {
        job.cancel.cancel();
        true
      }
      None => false,
    }
  }

  /// Cancel a job if it is running and discard its result.
  ///
  /// Returns false if the id is unknown or was already consumed.
  pub fn forget(&self, job_id: JobId) -> bool {
    if let Some(job) = lock(&self.running).remove(&job_id) {
      job.cancel.cancel();
      return true;
    }
    lock(&self.results).remove(&job_id).is_some()
  }

  /// Check if a job is still queued or running.
  pub fn is_pending(&self, job_id: JobId) -> bool {
    lock(&self.running).contains_key(&job_id)
  }

  /// Number of jobs queued or running.
  pub fn pending_count(&self) -> usize {
    lock(&self.running).len()
  }
}

// =============================================================================
// Tests
// =============================================================================
