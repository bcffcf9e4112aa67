//! SessionSummary / LiveSnapshot - Scheduler side outputs
//!
//! The summary is written once next to the recorded stream; the snapshot is
//! the latest merged sample handed to a live consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{SensorGroup, SensorSample, SourceMode, VehicleConfig};

/// Aggregate session counters, finalized exactly once on stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier (directory name)
    pub session_id: String,

    /// Session creation time
    pub session_start: DateTime<Utc>,

    /// Finalization time
    pub session_end: DateTime<Utc>,

    /// `session_end - session_start` in seconds
    pub duration_seconds: f64,

    /// Total samples appended (flushed or not)
    pub samples_collected: u64,

    /// Read failures per adapter group
    pub errors: BTreeMap<SensorGroup, u64>,

    /// Static vehicle metadata supplied at session start
    pub vehicle: VehicleConfig,

    /// Data-source mode of the run
    pub source_mode: SourceMode,
}

impl SessionSummary {
    /// Sum of all per-group errors
    pub fn total_errors(&self) -> u64 {
        self.errors.values().sum()
    }
}

/// Latest merged sample plus per-adapter connectivity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    /// Most recent merged sample
    pub sample: SensorSample,

    /// Connectivity per adapter group
    pub connection_status: BTreeMap<SensorGroup, bool>,

    /// Samples collected so far
    pub samples_collected: u64,
}
