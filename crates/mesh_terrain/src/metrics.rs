//! Engine-agnostic statistics for heightmap generation.
//!
//! Feature-gated and runtime-toggled: without the `metrics` feature every
//! `record_*` call is a no-op.
//!
//! # Usage
//!
//! ```ignore
//! use mesh_terrain::metrics::{GenerationMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let output = generate_with(&mesh, &params, &options)?;
//! metrics.record_generation(&output);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::sampler::SampleOutput;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Fixed-capacity window of the most recent values.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl RollingWindow<u64> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
        }
    }

    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = *self.buffer.iter().min()?;
        let max = *self.buffer.iter().max()?;
        Some((min, max))
    }
}

/// Summary of a timing window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimingStats {
    pub last_us: u64,
    pub avg_us: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub sample_count: u32,
}

impl From<&RollingWindow<u64>> for TimingStats {
    fn from(window: &RollingWindow<u64>) -> Self {
        let (min_us, max_us) = window.min_max().unwrap_or((0, 0));
        Self {
            last_us: window.last().copied().unwrap_or(0),
            avg_us: window.average().round() as u64,
            min_us,
            max_us,
            sample_count: window.len() as u32,
        }
    }
}

/// Point-in-time copy of [`GenerationMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub generation: TimingStats,
    pub total_generations: u64,
    pub total_rays: u64,
    pub total_hits: u64,
    pub total_cancelled: u64,
    pub total_failed: u64,
}

/// Cumulative generation statistics.
#[derive(Debug, Clone)]
pub struct GenerationMetrics {
    /// Rolling window of generation times in microseconds.
    pub generation_timings: RollingWindow<u64>,
    /// Completed generations this session.
    pub total_generations: u64,
    /// Rays cast by completed generations.
    pub total_rays: u64,
    /// Rays that hit a surface.
    pub total_hits: u64,
    /// Generations stopped by a cancellation token.
    pub total_cancelled: u64,
    /// Generations rejected by validation.
    pub total_failed: u64,
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self {
            generation_timings: RollingWindow::new(128),
            total_generations: 0,
            total_rays: 0,
            total_hits: 0,
            total_cancelled: 0,
            total_failed: 0,
        }
    }
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed generation pass.
    pub fn record_generation(&mut self, output: &SampleOutput) {
        if !is_enabled() {
            return;
        }
        self.generation_timings.push(output.elapsed_us);
        self.total_generations += 1;
        self.total_rays += output.layout.ray_count();
        self.total_hits += output.hit_count;
    }

    pub fn record_cancelled(&mut self) {
        if is_enabled() {
            self.total_cancelled += 1;
        }
    }

    pub fn record_failed(&mut self) {
        if is_enabled() {
            self.total_failed += 1;
        }
    }

    /// Fraction of rays that hit, over all completed generations.
    pub fn hit_ratio(&self) -> f64 {
        if self.total_rays == 0 {
            0.0
        } else {
            self.total_hits as f64 / self.total_rays as f64
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generation: TimingStats::from(&self.generation_timings),
            total_generations: self.total_generations,
            total_rays: self.total_rays,
            total_hits: self.total_hits,
            total_cancelled: self.total_cancelled,
            total_failed: self.total_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.average(), 20.0);

        // Oldest is evicted
        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 30.0);
        assert_eq!(window.min_max(), Some((20, 40)));
        assert_eq!(window.last(), Some(&40));
    }

    #[test]
    fn test_timing_stats_from_empty_window() {
        let stats = TimingStats::from(&RollingWindow::<u64>::new(4));
        assert_eq!(stats, TimingStats::default());
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_record_generation() {
        use glam::Vec3;

        use crate::sampler::{generate_with, SampleOptions};
        use crate::surfaces::BoxSurface;
        use crate::types::GenerationParameters;

        let slab = BoxSurface::new(Vec3::ZERO, Vec3::new(10.0, 5.0, 10.0));
        let params = GenerationParameters::new()
            .with_resolution(4)
            .with_padding(Vec3::new(10.0, 0.0, 10.0));
        let output = generate_with(&slab, &params, &SampleOptions::new()).unwrap();

        let mut metrics = GenerationMetrics::new();
        metrics.record_generation(&output);
        metrics.record_cancelled();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_generations, 1);
        assert_eq!(snapshot.total_rays, 16);
        assert_eq!(snapshot.total_hits, 9);
        assert_eq!(snapshot.total_cancelled, 1);
        assert_eq!(snapshot.generation.sample_count, 1);
        assert!((metrics.hit_ratio() - 9.0 / 16.0).abs() < 1e-9);
    }

    #[cfg(not(feature = "metrics"))]
    #[test]
    fn test_recording_disabled_without_feature() {
        let mut metrics = GenerationMetrics::new();
        metrics.record_cancelled();
        metrics.record_failed();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
