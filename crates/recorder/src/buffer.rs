//! SampleBuffer - pending samples behind one mutex, batch flush to the store
//!
//! The append path and the final flush share the same critical section, so a
//! sample is either pending or handed to the store, never both.

use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{RecordStore, SensorSample};
use tracing::{debug, error, warn};

use crate::error::RecorderError;
use crate::metrics::WriterMetrics;

/// Result of a single flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing pending, store untouched
    Empty,
    /// Samples written in one store call
    Written(usize),
    /// Write failed, samples kept for the next attempt
    Retained(usize),
}

/// Totals reported by `close`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseReport {
    /// Samples ever appended
    pub total_samples: u64,
    /// Samples that never reached the store
    pub unflushed: usize,
}

struct BufferState<S> {
    pending: Vec<SensorSample>,
    total: u64,
    store: S,
    closed: bool,
    /// Pending length that triggers the next flush; grows by one batch after a failure
    flush_threshold: usize,
}

/// Batching buffer in front of a record store
pub struct SampleBuffer<S: RecordStore> {
    state: Mutex<BufferState<S>>,
    batch_size: usize,
    max_pending: usize,
    metrics: Arc<WriterMetrics>,
}

impl<S: RecordStore> SampleBuffer<S> {
    pub fn new(store: S, batch_size: usize, max_pending: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            state: Mutex::new(BufferState {
                pending: Vec::with_capacity(batch_size),
                total: 0,
                store,
                closed: false,
                flush_threshold: batch_size,
            }),
            batch_size,
            max_pending: max_pending.max(batch_size),
            metrics: Arc::new(WriterMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<WriterMetrics> {
        self.metrics.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BufferState<S>>, RecorderError> {
        self.state.lock().map_err(|_| RecorderError::LockPoisoned)
    }

    /// Push one sample; flushes synchronously when a batch is complete
    ///
    /// Returns `StorageUnwritable` once retained samples reach the cap.
    pub fn append(&self, sample: SensorSample) -> Result<(), RecorderError> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(RecorderError::Closed);
        }

        state.pending.push(sample);
        state.total += 1;
        self.metrics.inc_appended();

        if state.pending.len() >= state.flush_threshold {
            match self.flush_locked(&mut state) {
                FlushOutcome::Retained(pending) if pending >= self.max_pending => {
                    self.metrics.set_pending(pending);
                    return Err(RecorderError::StorageUnwritable {
                        pending,
                        message: format!("retention cap of {} samples reached", self.max_pending),
                    });
                }
                FlushOutcome::Retained(pending) => {
                    state.flush_threshold = pending + self.batch_size;
                }
                _ => {
                    state.flush_threshold = self.batch_size;
                }
            }
        }

        self.metrics.set_pending(state.pending.len());
        Ok(())
    }

    /// Write everything pending in one store call
    pub fn flush(&self) -> Result<FlushOutcome, RecorderError> {
        let mut state = self.lock()?;
        let outcome = self.flush_locked(&mut state);
        if matches!(outcome, FlushOutcome::Written(_)) {
            state.flush_threshold = self.batch_size;
        }
        self.metrics.set_pending(state.pending.len());
        Ok(outcome)
    }

    fn flush_locked(&self, state: &mut BufferState<S>) -> FlushOutcome {
        if state.pending.is_empty() {
            return FlushOutcome::Empty;
        }

        let n = state.pending.len();
        match state.store.append_batch(&state.pending) {
            Ok(()) => {
                state.pending.clear();
                self.metrics.record_flush(n);
                debug!(samples = n, store = state.store.name(), "Batch flushed");
                FlushOutcome::Written(n)
            }
            Err(e) => {
                self.metrics.inc_flush_failures();
                warn!(
                    error = %e,
                    retained = n,
                    store = state.store.name(),
                    "Flush failed, samples retained"
                );
                FlushOutcome::Retained(n)
            }
        }
    }

    /// Final flush, then close the store
    ///
    /// Idempotent. Samples that cannot be written are reported, not returned
    /// as an error.
    pub fn close(&self) -> Result<CloseReport, RecorderError> {
        let mut state = self.lock()?;
        if state.closed {
            return Ok(CloseReport {
                total_samples: state.total,
                unflushed: state.pending.len(),
            });
        }

        let unflushed = match self.flush_locked(&mut state) {
            FlushOutcome::Retained(n) => {
                error!(lost = n, "Final flush failed, samples not persisted");
                n
            }
            _ => 0,
        };

        if let Err(e) = state.store.close() {
            warn!(error = %e, store = state.store.name(), "Store close failed");
        }
        state.closed = true;
        self.metrics.set_pending(state.pending.len());

        Ok(CloseReport {
            total_samples: state.total,
            unflushed,
        })
    }

    pub fn total_samples(&self) -> u64 {
        self.lock().map(|s| s.total).unwrap_or(0)
    }

    pub fn pending_len(&self) -> usize {
        self.lock().map(|s| s.pending.len()).unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.lock().map(|s| s.closed).unwrap_or(true)
    }
}
