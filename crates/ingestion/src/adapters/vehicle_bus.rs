//! 车辆总线 (OBD-II) 合成适配器
//!
//! 转速随机游走 (800..8000 rpm)，车速跟随转速，其余 PID 由转速派生。

use contracts::{columns, ContractError, ReadOutcome, Reading, SensorAdapter, SensorGroup, SourceMode};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use super::common::{celsius_to_fahrenheit, make_rng, not_connected, uniform};

const IDLE_RPM: f64 = 800.0;
const REDLINE_RPM: f64 = 8000.0;
const MAX_SPEED_MPH: f64 = 155.0;

/// 车辆总线合成适配器
pub struct SyntheticVehicleBus {
    connected: bool,
    rng: StdRng,
    rpm: f64,
    speed_mph: f64,
}

impl SyntheticVehicleBus {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            connected: false,
            rng: make_rng(seed),
            rpm: IDLE_RPM,
            speed_mph: 0.0,
        }
    }

    /// 推进一次游走
    fn step(&mut self) {
        // 每次读取约 10% 概率变化
        if self.rng.random_bool(0.1) {
            let delta = self.rng.random_range(-200..=500) as f64;
            self.rpm = (self.rpm + delta).clamp(IDLE_RPM, REDLINE_RPM);
            self.speed_mph = (self.rpm / 1000.0 * 10.0).clamp(0.0, MAX_SPEED_MPH);
        }
    }
}

impl SensorAdapter for SyntheticVehicleBus {
    fn group(&self) -> SensorGroup {
        SensorGroup::VehicleBus
    }

    fn source_mode(&self) -> SourceMode {
        SourceMode::Synthetic
    }

    fn connect(&mut self) -> bool {
        if !self.connected {
            info!(group = %self.group(), "Vehicle bus running in synthetic mode");
            self.connected = true;
        }
        true
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read(&mut self) -> ReadOutcome {
        if !self.connected {
            return Err(not_connected(self.group()));
        }
        self.step();

        let rpm = self.rpm;
        let rng = &mut self.rng;
        Ok(Reading::new()
            .with(columns::RPM, rpm)
            .with(columns::SPEED_MPH, self.speed_mph)
            .with(columns::THROTTLE_POS, ((rpm - IDLE_RPM) / 72.0).min(100.0))
            .with(
                columns::COOLANT_TEMP_F,
                celsius_to_fahrenheit(85.0 + uniform(rng, -2.0, 5.0)),
            )
            .with(
                columns::INTAKE_TEMP_F,
                celsius_to_fahrenheit(30.0 + uniform(rng, -5.0, 15.0)),
            )
            .with(columns::MAF_GPS, rpm / 100.0 + uniform(rng, -5.0, 5.0))
            .with(columns::ENGINE_LOAD, (rpm / 80.0).min(100.0))
            .with(columns::TIMING_ADVANCE, 15.0 + uniform(rng, -3.0, 10.0))
            .with(columns::FUEL_TRIM_SHORT, uniform(rng, -5.0, 5.0))
            .with(columns::FUEL_TRIM_LONG, uniform(rng, -3.0, 3.0)))
    }

    fn disconnect(&mut self) -> Result<(), ContractError> {
        debug!(group = %self.group(), "Vehicle bus disconnected");
        self.connected = false;
        Ok(())
    }
}
