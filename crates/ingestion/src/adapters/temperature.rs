//! 温度探头合成适配器与阈值分级

use std::time::Instant;

use contracts::{
    ContractError, ProbeConfig, ReadOutcome, Reading, SensorAdapter, SensorGroup, SourceMode,
};
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::common::{make_rng, not_connected, uniform};

/// 热负荷循环周期 (秒)
const HEAT_CYCLE_SEC: f64 = 600.0;

/// 热负荷最大温升 (°F)
const HEAT_RISE_F: f64 = 20.0;

/// 探头温度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProbeLevel {
    Normal,
    Warning,
    Critical,
}

impl ProbeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeLevel::Normal => "normal",
            ProbeLevel::Warning => "warning",
            ProbeLevel::Critical => "critical",
        }
    }
}

/// 按探头阈值分级
pub fn probe_level(probe: &ProbeConfig, value_f: f64) -> ProbeLevel {
    if value_f >= probe.critical_f {
        ProbeLevel::Critical
    } else if value_f >= probe.warning_f {
        ProbeLevel::Warning
    } else {
        ProbeLevel::Normal
    }
}

/// 温度探头合成适配器
pub struct SyntheticTemperature {
    probes: Vec<ProbeConfig>,
    rng: StdRng,
    started: Option<Instant>,
}

impl SyntheticTemperature {
    pub fn new(probes: &[ProbeConfig], seed: Option<u64>) -> Self {
        Self {
            probes: probes.to_vec(),
            rng: make_rng(seed),
            started: None,
        }
    }

    fn reading_at(&mut self, elapsed_sec: f64) -> Reading {
        let heat = elapsed_sec.rem_euclid(HEAT_CYCLE_SEC) / HEAT_CYCLE_SEC * HEAT_RISE_F;
        let rng = &mut self.rng;
        self.probes
            .iter()
            .map(|p| {
                let value = p.base_f + heat + uniform(rng, -5.0, 10.0);
                (p.column.clone(), Some(value))
            })
            .collect()
    }
}

impl SensorAdapter for SyntheticTemperature {
    fn group(&self) -> SensorGroup {
        SensorGroup::Temperature
    }

    fn source_mode(&self) -> SourceMode {
        SourceMode::Synthetic
    }

    fn connect(&mut self) -> bool {
        if self.started.is_none() {
            info!(
                group = %self.group(),
                probes = self.probes.len(),
                "Temperature probes running in synthetic mode"
            );
            self.started = Some(Instant::now());
        }
        true
    }

    fn is_connected(&self) -> bool {
        self.started.is_some()
    }

    fn read(&mut self) -> ReadOutcome {
        let Some(started) = self.started else {
            return Err(not_connected(self.group()));
        };
        Ok(self.reading_at(started.elapsed().as_secs_f64()))
    }

    fn disconnect(&mut self) -> Result<(), ContractError> {
        debug!(group = %self.group(), "Temperature probes disconnected");
        self.started = None;
        Ok(())
    }
}
