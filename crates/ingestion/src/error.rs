//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 零点标定样本不足
    #[error("calibration needs at least {needed} stationary samples, got {got}")]
    NotEnoughSamples {
        /// 最少样本数
        needed: usize,
        /// 实际样本数
        got: usize,
    },

    /// 标定样本含非有限值
    #[error("calibration sample {index} is not finite")]
    NonFiniteSample {
        /// 样本序号
        index: usize,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
