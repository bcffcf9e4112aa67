//! Acquisition error types

use contracts::SensorGroup;
use recorder::RecorderError;
use thiserror::Error;

/// Acquisition-specific errors
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Required adapters failed to connect
    #[error("sensors unavailable: {groups:?}")]
    SensorsUnavailable { groups: Vec<SensorGroup> },

    /// Tick rate must be positive and finite
    #[error("invalid target rate: {rate} Hz")]
    InvalidRate { rate: f64 },

    /// Status interval does not fit a `Duration`
    #[error("invalid status interval: {seconds} s")]
    InvalidStatusInterval { seconds: f64 },

    /// Acquisition thread could not be started
    #[error("failed to spawn acquisition thread: {message}")]
    ThreadSpawn { message: String },

    /// Acquisition thread panicked
    #[error("acquisition thread panicked")]
    ThreadPanicked,

    /// Session storage error
    #[error("recorder error: {0}")]
    Recorder(#[from] RecorderError),
}

impl AcquisitionError {
    pub fn thread_spawn(message: impl Into<String>) -> Self {
        Self::ThreadSpawn {
            message: message.into(),
        }
    }
}
