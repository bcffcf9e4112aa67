//! Recorder error types

use std::path::PathBuf;

use thiserror::Error;

/// Recorder-specific errors
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Session storage cannot be allocated (fatal at start)
    #[error("failed to create session at '{path}': {message}")]
    SessionCreate { path: PathBuf, message: String },

    /// Storage stayed unwritable past the retention cap (fatal during run)
    #[error("storage unwritable, {pending} samples pending: {message}")]
    StorageUnwritable { pending: usize, message: String },

    /// Append after close
    #[error("sample buffer already closed")]
    Closed,

    /// Buffer lock poisoned by a panicking holder
    #[error("sample buffer lock poisoned")]
    LockPoisoned,

    /// No such session in the catalog
    #[error("session not found: {name}")]
    SessionNotFound { name: String },

    /// Summary document error
    #[error("session summary error: {message}")]
    Summary { message: String },

    /// Store error (from contract)
    #[error("store error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecorderError {
    /// Create a session creation error
    pub fn session_create(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SessionCreate {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a summary error
    pub fn summary(message: impl Into<String>) -> Self {
        Self::Summary {
            message: message.into(),
        }
    }

    /// Whether acquisition must stop
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SessionCreate { .. }
                | Self::StorageUnwritable { .. }
                | Self::Closed
                | Self::LockPoisoned
        )
    }
}
