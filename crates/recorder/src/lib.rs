//! # Recorder
//!
//! 会话存储模块。
//!
//! 负责：
//! - 单锁缓冲待写样本，按批刷写到只追加的存储
//! - 刷写失败时保留样本，超过上限升级为致命错误
//! - 每个会话分配一个不复用的目录
//! - 会话摘要只写一次
//! - 枚举、加载、删除已记录的会话
//!
//! ## 用法
//!
//! ```ignore
//! use recorder::{session_columns, SessionWriter};
//!
//! let writer = SessionWriter::create(
//!     &blueprint.storage,
//!     session_columns(&blueprint.sensors.temperature.probes),
//!     blueprint.vehicle.clone(),
//!     blueprint.acquisition.source_mode,
//! )?;
//! writer.append(sample)?;
//! let summary = writer.finish(errors)?;
//! ```

mod buffer;
mod catalog;
mod error;
mod metrics;
mod session;
mod stores;

pub use buffer::{CloseReport, FlushOutcome, SampleBuffer};
pub use catalog::{load_dir, SessionCatalog, SessionInfo};
pub use error::RecorderError;
pub use metrics::{WriterMetrics, WriterMetricsSnapshot};
pub use session::{
    read_summary, SessionDir, SessionWriter, DATA_FILE, SESSION_PREFIX, SUMMARY_FILE,
};
pub use stores::{parse_cell, read_record, session_columns, CsvRecordStore};
