//! 脚本化适配器
//!
//! 用于无硬件环境的测试：按脚本循环返回读数，可注入连接失败、读取失败、
//! 读取延迟与断开失败。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{ContractError, ReadOutcome, Reading, SensorAdapter, SensorGroup, SourceMode};
use tracing::trace;

/// 读取失败注入策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePlan {
    /// 从不失败
    #[default]
    Never,
    /// 每次都失败
    Always,
    /// 第 n, 2n, 3n ... 次读取失败
    EveryNth(u64),
}

/// 脚本化适配器
pub struct ScriptedAdapter {
    group: SensorGroup,
    script: Vec<Reading>,
    cursor: usize,
    accept_connect: bool,
    connected: bool,
    failure: FailurePlan,
    fail_disconnect: bool,
    read_delay: Option<Duration>,
    reads: Arc<AtomicU64>,
}

impl ScriptedAdapter {
    /// 创建返回空读数的适配器
    pub fn new(group: SensorGroup) -> Self {
        Self {
            group,
            script: Vec::new(),
            cursor: 0,
            accept_connect: true,
            connected: false,
            failure: FailurePlan::Never,
            fail_disconnect: false,
            read_delay: None,
            reads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 循环返回的读数序列
    pub fn with_readings(mut self, script: Vec<Reading>) -> Self {
        self.script = script;
        self
    }

    /// 固定读数
    pub fn with_reading(self, reading: Reading) -> Self {
        self.with_readings(vec![reading])
    }

    pub fn with_failure(mut self, plan: FailurePlan) -> Self {
        self.failure = plan;
        self
    }

    /// 读取总是失败
    pub fn failing(self) -> Self {
        self.with_failure(FailurePlan::Always)
    }

    /// 拒绝连接
    pub fn refusing_connect(mut self) -> Self {
        self.accept_connect = false;
        self
    }

    /// 断开时报错
    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// 每次读取阻塞一段时间
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// 读取次数计数器 (共享)
    pub fn read_counter(&self) -> Arc<AtomicU64> {
        self.reads.clone()
    }

    fn should_fail(&self, n: u64) -> bool {
        match self.failure {
            FailurePlan::Never => false,
            FailurePlan::Always => true,
            FailurePlan::EveryNth(k) => k > 0 && n % k == 0,
        }
    }
}

impl SensorAdapter for ScriptedAdapter {
    fn group(&self) -> SensorGroup {
        self.group
    }

    fn source_mode(&self) -> SourceMode {
        SourceMode::Synthetic
    }

    fn connect(&mut self) -> bool {
        self.connected = self.accept_connect;
        self.connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read(&mut self) -> ReadOutcome {
        let n = self.reads.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(delay) = self.read_delay {
            std::thread::sleep(delay);
        }
        if self.should_fail(n) {
            trace!(group = %self.group, read = n, "scripted read failure");
            return Err(ContractError::sensor_read(self.group, "scripted failure"));
        }
        if self.script.is_empty() {
            return Ok(Reading::new());
        }
        let reading = self.script[self.cursor % self.script.len()].clone();
        self.cursor += 1;
        Ok(reading)
    }

    fn disconnect(&mut self) -> Result<(), ContractError> {
        self.connected = false;
        if self.fail_disconnect {
            return Err(ContractError::sensor_disconnect(
                self.group,
                "scripted disconnect failure",
            ));
        }
        Ok(())
    }
}
