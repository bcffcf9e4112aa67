//! SensorAdapter trait - normalized sensor reading contract
//!
//! Every driver (physical or synthetic) is consumed through this trait.
//! The scheduler never inspects the concrete type or the source mode.

use std::time::Duration;

use crate::{ContractError, Reading, SensorGroup, SourceMode};

/// Outcome of one adapter read
///
/// `Ok` with an empty reading means "no data this tick"; `Err` is a read
/// failure that the scheduler counts against the adapter's group.
pub type ReadOutcome = Result<Reading, ContractError>;

/// Sensor adapter trait
///
/// Adapters are owned by the acquisition thread and called sequentially,
/// so `&mut self` is enough and no internal locking is required.
///
/// Position adapters always emit `gps_valid` next to the coordinates;
/// coordinates without it are not treated as a fix.
///
/// # Example
///
/// ```ignore
/// let mut adapter: Box<dyn SensorAdapter> = registry.build(SensorGroup::Inertial)?;
/// if adapter.connect() {
///     match adapter.read() {
///         Ok(reading) => sample.merge(adapter.group(), reading),
///         Err(e) => errors.record(adapter.group(), &e),
///     }
/// }
/// ```
pub trait SensorAdapter: Send {
    /// Field group this adapter populates
    fn group(&self) -> SensorGroup;

    /// Data-source mode chosen at construction
    fn source_mode(&self) -> SourceMode;

    /// Establish the connection
    ///
    /// Idempotent. Bounded by the adapter's own timeout and returns `false`
    /// on hard failure instead of erroring.
    fn connect(&mut self) -> bool;

    /// Configured bound for `connect()`, if the device has one
    fn connect_timeout(&self) -> Option<Duration> {
        None
    }

    /// Current connectivity
    fn is_connected(&self) -> bool;

    /// Read current values
    ///
    /// Must not block beyond the adapter's own timeout.
    fn read(&mut self) -> ReadOutcome;

    /// Release the device
    fn disconnect(&mut self) -> Result<(), ContractError>;
}
