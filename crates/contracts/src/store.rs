//! RecordStore trait - Session Writer output interface
//!
//! Defines the abstract durable append-only store for recorded samples.

use crate::{ContractError, SensorSample};

/// Append-only record store
///
/// One `append_batch` call per flush; the header is declared once when the
/// store is created.
pub trait RecordStore: Send {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Append a batch of samples in one write
    ///
    /// # Errors
    /// Returns write error (should include context). On error the caller keeps
    /// the batch and retries it on the next flush.
    fn append_batch(&mut self, samples: &[SensorSample]) -> Result<(), ContractError>;

    /// Close store
    fn close(&mut self) -> Result<(), ContractError>;
}
