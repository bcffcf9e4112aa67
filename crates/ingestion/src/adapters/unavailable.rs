//! 物理模式下未链接驱动的占位适配器
//!
//! `connect()` 恒为 false，调度器据此把该组视为永久断开。

use std::time::Duration;

use contracts::{ContractError, ReadOutcome, SensorAdapter, SensorGroup, SourceMode};
use tracing::warn;

/// 无驱动占位适配器
pub struct UnavailableAdapter {
    group: SensorGroup,
    reason: String,
    port: Option<String>,
    connect_timeout: Option<Duration>,
}

impl UnavailableAdapter {
    pub fn new(group: SensorGroup, reason: impl Into<String>) -> Self {
        Self {
            group,
            reason: reason.into(),
            port: None,
            connect_timeout: None,
        }
    }

    /// Device settings a driver would have been opened with
    pub fn with_device(mut self, port: Option<String>, connect_timeout: Duration) -> Self {
        self.port = port;
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }
}

impl SensorAdapter for UnavailableAdapter {
    fn group(&self) -> SensorGroup {
        self.group
    }

    fn source_mode(&self) -> SourceMode {
        SourceMode::Physical
    }

    fn connect(&mut self) -> bool {
        warn!(
            group = %self.group,
            reason = %self.reason,
            port = self.port.as_deref().unwrap_or("auto"),
            timeout_ms = self.connect_timeout.map(|t| t.as_millis() as u64),
            "Sensor unavailable"
        );
        false
    }

    fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn read(&mut self) -> ReadOutcome {
        Err(ContractError::sensor_read(self.group, self.reason.clone()))
    }

    fn disconnect(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
