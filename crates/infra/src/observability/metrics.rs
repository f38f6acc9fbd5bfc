//! Sync metrics for the behavior collector
//!
//! Counters are lock-free; latency samples live in a bounded ring buffer
//! (`VecDeque`, O(1) eviction). Recording never fails the caller.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

/// Latency samples kept for percentile calculations
pub const LATENCY_SAMPLES: usize = 100;

/// Counters and latencies for collector round trips
#[derive(Debug, Default)]
pub struct SyncMetrics {
    sync_attempts: AtomicU64,
    sync_successes: AtomicU64,
    sync_failures: AtomicU64,
    load_attempts: AtomicU64,
    load_successes: AtomicU64,
    load_failures: AtomicU64,
    sync_latencies_ms: Mutex<VecDeque<u64>>,
}

/// Point-in-time copy of [`SyncMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncMetricsSnapshot {
    pub sync_attempts: u64,
    pub sync_successes: u64,
    pub sync_failures: u64,
    pub load_attempts: u64,
    pub load_successes: u64,
    pub load_failures: u64,
    pub p95_sync_latency_ms: Option<u64>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one push.
    pub fn record_sync(&self, success: bool, latency: Duration) {
        self.sync_attempts.fetch_add(1, Ordering::Relaxed);
        if success {
            self.sync_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.sync_failures.fetch_add(1, Ordering::Relaxed);
        }

        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        let mut samples = self.sync_latencies_ms.lock();
        samples.push_back(ms);
        if samples.len() > LATENCY_SAMPLES {
            samples.pop_front();
        }
    }

    /// Record the outcome of one fetch.
    pub fn record_load(&self, success: bool) {
        self.load_attempts.fetch_add(1, Ordering::Relaxed);
        if success {
            self.load_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.load_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// P95 push latency, `None` until the first sample.
    #[must_use]
    pub fn p95_sync_latency_ms(&self) -> Option<u64> {
        let samples = self.sync_latencies_ms.lock();
        if samples.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = samples.iter().copied().collect();
        drop(samples);
        sorted.sort_unstable();

        let index = ((sorted.len() as f64) * 0.95).ceil() as usize;
        sorted.get(index.saturating_sub(1).min(sorted.len() - 1)).copied()
    }

    #[must_use]
    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            sync_attempts: self.sync_attempts.load(Ordering::Relaxed),
            sync_successes: self.sync_successes.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
            load_attempts: self.load_attempts.load(Ordering::Relaxed),
            load_successes: self.load_successes.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            p95_sync_latency_ms: self.p95_sync_latency_ms(),
        }
    }
}
