//! 分析错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to serialize report: {message}")]
    Serialize { message: String },

    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }
}
