//! # Acquisition
//!
//! 采集调度模块。
//!
//! 负责：
//! - 专用线程上以固定频率驱动 tick
//! - 顺序读取各适配器，单个失败只计数不中断
//! - 合并样本写入会话缓冲，发布最新快照
//! - 温度告警 (边沿触发)、状态日志、Prometheus 指标
//! - 停止时只做一次收尾：最终刷写、会话摘要、释放适配器
//!
//! ## 用法
//!
//! ```ignore
//! use acquisition::{Scheduler, SchedulerHandle};
//!
//! let scheduler = Scheduler::new(&bp.acquisition, adapters, writer, &bp.sensors.temperature.probes)?;
//! let handle = SchedulerHandle::spawn(scheduler)?;
//! // ...
//! handle.stop();
//! let report = handle.join()?;
//! ```

mod alerts;
mod error;
mod handle;
mod live;
mod scheduler;
mod stop;
mod window;

pub use alerts::{TemperatureAlert, TemperatureMonitor};
pub use error::AcquisitionError;
pub use handle::{SchedulerHandle, ACQUISITION_THREAD};
pub use live::SnapshotPublisher;
pub use scheduler::{
    connect_adapters, disconnect_adapters, AcquisitionReport, Scheduler, StopReason,
};
pub use stop::StopSignal;
pub use window::TickWindow;
