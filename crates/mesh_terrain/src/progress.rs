//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Sink for row-level progress updates.
///
/// Called once per completed row with `(rows_done, total_rows)`. In parallel
/// generation the calls come from worker threads and may arrive out of order,
/// so `rows_done` is a count, not a row index.
pub trait ProgressSink: Send + Sync {
  fn report(&self, current: u32, total: u32);
}

impl<F> ProgressSink for F
where
  F: Fn(u32, u32) + Send + Sync,
{
  fn report(&self, current: u32, total: u32) {
    self(current, total)
  }
}

/// Progress sink that discards all updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
  fn report(&self, _current: u32, _total: u32) {}
}

/// Progress counter readable from another thread.
///
/// Used by background jobs so a UI can poll the fraction done.
#[derive(Debug, Default)]
pub struct SharedProgress {
  current: AtomicU32,
  total: AtomicU32,
}

impl SharedProgress {
  pub fn new() -> Self {
    Self::default()
  }

  /// Completed fraction in [0, 1]. Zero until the first report.
  pub fn fraction(&self) -> f32 {
    let total = self.total.load(Ordering::Relaxed);
    if total == 0 {
      return 0.0;
    }
    self.current.load(Ordering::Relaxed) as f32 / total as f32
  }

  /// Last reported `(current, total)`.
  pub fn get(&self) -> (u32, u32) {
    (
      self.current.load(Ordering::Relaxed),
      self.total.load(Ordering::Relaxed),
    )
  }
}

impl ProgressSink for SharedProgress {
  fn report(&self, current: u32, total: u32) {
    self.total.store(total, Ordering::Relaxed);
    self.current.fetch_max(current, Ordering::Relaxed);
  }
}

/// Cloneable flag checked by the sampler between rows.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
  cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation. All clones observe it.
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::Relaxed);
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::Relaxed)
  }
}
