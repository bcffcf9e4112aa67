//! 惯性传感器合成适配器
//!
//! 20 秒循环：加速 (30%) / 制动 (20%) / 过弯 (20%) / 巡航 (30%)。
//! 原始读数经过与真实设备相同的标定、旋转与滤波路径。

use std::time::Instant;

use contracts::{
    columns, ContractError, InertialConfig, ReadOutcome, Reading, SensorAdapter, SensorGroup,
    SourceMode,
};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::common::{make_rng, not_connected, uniform};
use crate::calibration::{ComplementaryFilter, InertialFrame, GRAVITY};

/// 合成驾驶循环周期 (秒)
const CYCLE_SEC: f64 = 20.0;

/// 驾驶阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivePhase {
    Accelerating,
    Braking,
    Cornering,
    Cruising,
}

impl DrivePhase {
    /// 循环内时间 -> 阶段
    pub fn at(elapsed_sec: f64) -> Self {
        let phase = elapsed_sec.rem_euclid(CYCLE_SEC) / CYCLE_SEC;
        if phase < 0.3 {
            DrivePhase::Accelerating
        } else if phase < 0.5 {
            DrivePhase::Braking
        } else if phase < 0.7 {
            DrivePhase::Cornering
        } else {
            DrivePhase::Cruising
        }
    }
}

/// 惯性传感器合成适配器
pub struct SyntheticInertial {
    frame: InertialFrame,
    filter: ComplementaryFilter,
    rng: StdRng,
    started: Option<Instant>,
    last_read: Option<Instant>,
}

impl SyntheticInertial {
    pub fn new(config: &InertialConfig, seed: Option<u64>) -> Self {
        Self {
            frame: InertialFrame::from_config(config),
            filter: ComplementaryFilter::new(config.filter_alpha),
            rng: make_rng(seed),
            started: None,
            last_read: None,
        }
    }

    /// 生成某一时刻的原始 (accel m/s², gyro rad/s)
    fn raw_at(&mut self, elapsed_sec: f64) -> (Vector3<f64>, Vector3<f64>) {
        let rng = &mut self.rng;
        let (ax, ay) = match DrivePhase::at(elapsed_sec) {
            DrivePhase::Accelerating => (3.0 + uniform(rng, -0.5, 0.5), uniform(rng, -2.0, 2.0)),
            DrivePhase::Braking => (-5.0 + uniform(rng, -1.0, 1.0), uniform(rng, -2.0, 2.0)),
            DrivePhase::Cornering => (uniform(rng, -2.0, 2.0), 8.0 + uniform(rng, -1.0, 1.0)),
            DrivePhase::Cruising => (uniform(rng, -1.0, 1.0), uniform(rng, -2.0, 2.0)),
        };
        let az = GRAVITY + uniform(rng, -2.0, 2.0);

        let gyro = Vector3::new(
            uniform(rng, -0.1, 0.1),
            uniform(rng, -0.1, 0.1),
            uniform(rng, -0.2, 0.2),
        );
        (Vector3::new(ax, ay, az), gyro)
    }
}

impl SensorAdapter for SyntheticInertial {
    fn group(&self) -> SensorGroup {
        SensorGroup::Inertial
    }

    fn source_mode(&self) -> SourceMode {
        SourceMode::Synthetic
    }

    fn connect(&mut self) -> bool {
        if self.started.is_none() {
            info!(group = %self.group(), "Inertial sensor running in synthetic mode");
            let now = Instant::now();
            self.started = Some(now);
            self.last_read = Some(now);
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
        let now = Instant::now();
        let dt = self
            .last_read
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0);
        self.last_read = Some(now);

        let (accel_raw, gyro_raw) = self.raw_at(now.duration_since(started).as_secs_f64());
        let (accel, gyro) = self.frame.to_vehicle(accel_raw, gyro_raw);
        let g = InertialFrame::g_forces(&accel);
        let (pitch, roll) = self.filter.update(&accel, &gyro, dt);

        Ok(Reading::new()
            .with(columns::ACCEL_LONG_G, g.longitudinal)
            .with(columns::ACCEL_LAT_G, g.lateral)
            .with(columns::ACCEL_VERT_G, g.vertical)
            .with(columns::ACCEL_TOTAL_G, g.total)
            .with(columns::PITCH_DEG, pitch)
            .with(columns::ROLL_DEG, roll)
            .with(columns::YAW_RATE_DPS, gyro.z.to_degrees()))
    }

    fn disconnect(&mut self) -> Result<(), ContractError> {
        debug!(group = %self.group(), "Inertial sensor disconnected");
        self.started = None;
        self.last_read = None;
        Ok(())
    }
}
