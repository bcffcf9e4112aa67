//! 采集指标
//!
//! Prometheus facade 记录 + 内存聚合器 (运行结束时输出摘要)。

use std::collections::BTreeMap;

use contracts::SensorGroup;
use metrics::{counter, gauge, histogram};

/// 记录一次 tick
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_tick;
///
/// let started = Instant::now();
/// // read adapters, append sample ...
/// let elapsed = started.elapsed();
/// record_tick(elapsed.as_secs_f64() * 1000.0, elapsed > period);
/// ```
pub fn record_tick(duration_ms: f64, overrun: bool) {
    counter!("trackday_ticks_total").increment(1);
    histogram!("trackday_tick_duration_ms").record(duration_ms);
    if overrun {
        counter!("trackday_tick_overruns_total").increment(1);
    }
}

/// 记录适配器读取失败
pub fn record_sensor_read_error(group: SensorGroup) {
    counter!(
        "trackday_sensor_read_errors_total",
        "group" => group.as_str()
    )
    .increment(1);
}

/// 记录适配器连接状态
pub fn record_sensor_connected(group: SensorGroup, connected: bool) {
    gauge!(
        "trackday_sensor_connected",
        "group" => group.as_str()
    )
    .set(if connected { 1.0 } else { 0.0 });
}

/// 记录批量刷写结果
pub fn record_flush(success: bool, samples: usize) {
    let status = if success { "success" } else { "failure" };
    counter!("trackday_flush_total", "status" => status).increment(1);
    if success {
        counter!("trackday_samples_written_total").increment(samples as u64);
    }
}

/// 记录待写样本数
pub fn record_pending_samples(pending: usize) {
    gauge!("trackday_pending_samples").set(pending as f64);
}

/// 记录温度告警 (仅在等级变化时调用)
pub fn record_temperature_alert(probe: &str, level: &'static str) {
    counter!(
        "trackday_temperature_alerts_total",
        "probe" => probe.to_string(),
        "level" => level
    )
    .increment(1);
}

/// 采集指标聚合器
///
/// 在内存中聚合，运行结束后输出摘要。
#[derive(Debug, Clone, Default)]
pub struct AcquisitionMetricsAggregator {
    /// 总 tick 数
    pub total_ticks: u64,

    /// 超时 tick 数
    pub overruns: u64,

    /// tick 耗时统计 (毫秒)
    pub tick_stats: RunningStats,

    /// 各组读取失败次数
    pub read_errors: BTreeMap<SensorGroup, u64>,

    /// 刷写失败次数
    pub flush_failures: u64,

    /// 温度告警次数
    pub temperature_alerts: u64,

    /// 采集已运行时间 (秒)
    pub elapsed_secs: f64,
}

impl AcquisitionMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新 tick 统计
    pub fn update_tick(&mut self, duration_ms: f64, overrun: bool, elapsed_secs: f64) {
        self.total_ticks += 1;
        if overrun {
            self.overruns += 1;
        }
        self.tick_stats.push(duration_ms);
        self.elapsed_secs = elapsed_secs;
    }

    pub fn record_error(&mut self, group: SensorGroup) {
        *self.read_errors.entry(group).or_insert(0) += 1;
    }

    /// 有效采样率 (Hz)
    pub fn effective_rate(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.total_ticks as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }

    /// 生成摘要
    pub fn summary(&self) -> AcquisitionSummary {
        AcquisitionSummary {
            total_ticks: self.total_ticks,
            overruns: self.overruns,
            overrun_rate: if self.total_ticks > 0 {
                self.overruns as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            },
            effective_rate_hz: self.effective_rate(),
            tick_ms: StatsSummary::from(&self.tick_stats),
            read_errors: self.read_errors.clone(),
            flush_failures: self.flush_failures,
            temperature_alerts: self.temperature_alerts,
        }
    }
}

/// 采集摘要
#[derive(Debug, Clone, Default)]
pub struct AcquisitionSummary {
    pub total_ticks: u64,
    pub overruns: u64,
    pub overrun_rate: f64,
    pub effective_rate_hz: f64,
    pub tick_ms: StatsSummary,
    pub read_errors: BTreeMap<SensorGroup, u64>,
    pub flush_failures: u64,
    pub temperature_alerts: u64,
}

impl std::fmt::Display for AcquisitionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Acquisition Summary ===")?;
        writeln!(f, "Ticks: {}", self.total_ticks)?;
        writeln!(f, "Effective rate: {:.2} Hz", self.effective_rate_hz)?;
        writeln!(
            f,
            "Overruns: {} ({:.2}%)",
            self.overruns, self.overrun_rate
        )?;
        writeln!(f, "Tick duration (ms): {}", self.tick_ms)?;
        writeln!(f, "Flush failures: {}", self.flush_failures)?;
        writeln!(f, "Temperature alerts: {}", self.temperature_alerts)?;

        if !self.read_errors.is_empty() {
            writeln!(f, "Read errors:")?;
            for (group, count) in &self.read_errors {
                writeln!(f, "  {}: {}", group, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差 (n-1)
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [18.0, 20.0, 22.0, 20.0] {
            stats.push(v);
        }
        assert_eq!(stats.count(), 4);
        assert!((stats.mean() - 20.0).abs() < 1e-10);
        assert!((stats.min() - 18.0).abs() < 1e-10);
        assert!((stats.max() - 22.0).abs() < 1e-10);
        assert!((stats.variance() - 8.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator() {
        let mut agg = AcquisitionMetricsAggregator::new();
        for i in 0..50 {
            agg.update_tick(2.0, i == 10, (i + 1) as f64 * 0.02);
        }
        agg.record_error(SensorGroup::Inertial);
        agg.record_error(SensorGroup::Inertial);

        let summary = agg.summary();
        assert_eq!(summary.total_ticks, 50);
        assert_eq!(summary.overruns, 1);
        assert!((summary.overrun_rate - 2.0).abs() < 1e-10);
        assert!((summary.effective_rate_hz - 50.0).abs() < 1e-9);
        assert_eq!(summary.read_errors.get(&SensorGroup::Inertial), Some(&2));
    }

    #[test]
    fn test_summary_display() {
        let mut agg = AcquisitionMetricsAggregator::new();
        agg.update_tick(1.5, false, 1.0);
        agg.record_error(SensorGroup::Position);

        let output = agg.summary().to_string();
        assert!(output.contains("Ticks: 1"));
        assert!(output.contains("position: 1"));
        assert!(output.contains("0.00%"));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // no recorder installed: calls are no-ops
        record_tick(3.0, true);
        record_sensor_read_error(SensorGroup::VehicleBus);
        record_sensor_connected(SensorGroup::Temperature, false);
        record_flush(true, 100);
        record_pending_samples(0);
        record_temperature_alert("oil", "warning");
    }
}
