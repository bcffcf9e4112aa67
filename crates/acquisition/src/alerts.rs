//! 温度告警
//!
//! 边沿触发：只在探头等级变化时告警，持续超限不会重复刷日志。

use std::collections::HashMap;

use contracts::{ProbeConfig, SensorSample};
use ingestion::{probe_level, ProbeLevel};
use tracing::{error, info, warn};

/// 一次等级变化
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureAlert {
    pub probe_id: String,
    pub column: String,
    pub level: ProbeLevel,
    pub value_f: f64,
}

/// 按探头跟踪当前等级
#[derive(Debug, Clone, Default)]
pub struct TemperatureMonitor {
    probes: Vec<ProbeConfig>,
    levels: HashMap<String, ProbeLevel>,
}

impl TemperatureMonitor {
    pub fn new(probes: &[ProbeConfig]) -> Self {
        Self {
            probes: probes.to_vec(),
            levels: HashMap::new(),
        }
    }

    /// 检查一个样本，返回新进入 warning/critical 的探头
    ///
    /// 缺失读数不改变等级。
    pub fn check(&mut self, sample: &SensorSample) -> Vec<TemperatureAlert> {
        let mut alerts = Vec::new();
        for probe in &self.probes {
            let Some(value_f) = sample.temperature.get(&probe.column) else {
                continue;
            };
            let level = probe_level(probe, value_f);
            let previous = self
                .levels
                .insert(probe.id.clone(), level)
                .unwrap_or(ProbeLevel::Normal);
            if level == previous {
                continue;
            }

            match level {
                ProbeLevel::Critical => error!(
                    probe = %probe.id,
                    value_f,
                    limit_f = probe.critical_f,
                    "Temperature critical"
                ),
                ProbeLevel::Warning => warn!(
                    probe = %probe.id,
                    value_f,
                    limit_f = probe.warning_f,
                    "Temperature warning"
                ),
                ProbeLevel::Normal => {
                    info!(probe = %probe.id, value_f, "Temperature back to normal");
                    continue;
                }
            }

            observability::record_temperature_alert(&probe.id, level.as_str());
            alerts.push(TemperatureAlert {
                probe_id: probe.id.clone(),
                column: probe.column.clone(),
                level,
                value_f,
            });
        }
        alerts
    }

    /// 探头当前等级
    pub fn level(&self, probe_id: &str) -> ProbeLevel {
        self.levels
            .get(probe_id)
            .copied()
            .unwrap_or(ProbeLevel::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Reading, SensorGroup};

    fn oil(value: Option<f64>) -> SensorSample {
        let mut sample = SensorSample::default();
        sample.merge(
            SensorGroup::Temperature,
            Reading::new().with("temp_oil_f", value),
        );
        sample
    }

    #[test]
    fn test_edge_triggered() {
        let probes = vec![ProbeConfig::new("oil", "temp_oil_f", 280.0, 300.0, 190.0)];
        let mut monitor = TemperatureMonitor::new(&probes);

        assert!(monitor.check(&oil(Some(250.0))).is_empty());

        let alerts = monitor.check(&oil(Some(285.0)));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, ProbeLevel::Warning);

        // still warning: no repeat
        assert!(monitor.check(&oil(Some(290.0))).is_empty());
        // missing reading keeps the level
        assert!(monitor.check(&oil(None)).is_empty());
        assert_eq!(monitor.level("oil"), ProbeLevel::Warning);

        let alerts = monitor.check(&oil(Some(305.0)));
        assert_eq!(alerts[0].level, ProbeLevel::Critical);

        // recovery is logged, not returned
        assert!(monitor.check(&oil(Some(200.0))).is_empty());
        assert_eq!(monitor.level("oil"), ProbeLevel::Normal);
        assert_eq!(monitor.check(&oil(Some(281.0))).len(), 1);
    }
}
