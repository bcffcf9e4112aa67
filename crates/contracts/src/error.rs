//! Layered error definitions
//!
//! Categorized by source: config / sensor / storage / analysis

use thiserror::Error;

use crate::SensorGroup;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sensor Errors =====
    /// Adapter read failure (recoverable, counted per group)
    #[error("sensor '{group}' read error: {message}")]
    SensorRead { group: SensorGroup, message: String },

    /// Adapter connect failure
    #[error("sensor '{group}' connection error: {message}")]
    SensorConnection { group: SensorGroup, message: String },

    /// Adapter release failure
    #[error("sensor '{group}' disconnect error: {message}")]
    SensorDisconnect { group: SensorGroup, message: String },

    // ===== Storage Errors =====
    /// Record store write error
    #[error("store '{store}' write error: {message}")]
    StoreWrite { store: String, message: String },

    /// Record store cannot be created
    #[error("store '{store}' creation error: {message}")]
    StoreCreate { store: String, message: String },

    /// Recorded stream cannot be decoded
    #[error("record parse error at row {row}: {message}")]
    RecordParse { row: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sensor read error
    pub fn sensor_read(group: SensorGroup, message: impl Into<String>) -> Self {
        Self::SensorRead {
            group,
            message: message.into(),
        }
    }

    /// Create sensor connection error
    pub fn sensor_connection(group: SensorGroup, message: impl Into<String>) -> Self {
        Self::SensorConnection {
            group,
            message: message.into(),
        }
    }

    /// Create sensor disconnect error
    pub fn sensor_disconnect(group: SensorGroup, message: impl Into<String>) -> Self {
        Self::SensorDisconnect {
            group,
            message: message.into(),
        }
    }

    /// Create store write error
    pub fn store_write(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Create store creation error
    pub fn store_create(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreCreate {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Create record parse error
    pub fn record_parse(row: usize, message: impl Into<String>) -> Self {
        Self::RecordParse {
            row,
            message: message.into(),
        }
    }
}
