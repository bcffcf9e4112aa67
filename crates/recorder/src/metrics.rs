//! Writer metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for the sample buffer / session writer
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Samples accepted by `append`
    samples_appended: AtomicU64,
    /// Samples durably handed to the store
    samples_written: AtomicU64,
    /// Successful batch flushes
    flush_count: AtomicU64,
    /// Failed batch flushes
    flush_failures: AtomicU64,
    /// Samples currently pending
    pending: AtomicUsize,
}

impl WriterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_appended(&self) {
        self.samples_appended.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful flush of `n` samples
    pub fn record_flush(&self, n: usize) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        self.samples_written.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn inc_flush_failures(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_pending(&self, len: usize) {
        self.pending.store(len, Ordering::Relaxed);
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub fn flush_failures(&self) -> u64 {
        self.flush_failures.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> WriterMetricsSnapshot {
        WriterMetricsSnapshot {
            samples_appended: self.samples_appended.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            flush_count: self.flush_count(),
            flush_failures: self.flush_failures(),
            pending: self.pending.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of writer metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterMetricsSnapshot {
    pub samples_appended: u64,
    pub samples_written: u64,
    pub flush_count: u64,
    pub flush_failures: u64,
    pub pending: usize,
}
