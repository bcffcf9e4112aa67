//! 卫星定位合成适配器
//!
//! 沿圆形赛道运动 (默认半径 0.002°，120 秒一圈)。

use std::f64::consts::TAU;
use std::time::Instant;

use contracts::{
    columns, ContractError, PositionConfig, ReadOutcome, Reading, SensorAdapter, SensorGroup,
    SourceMode,
};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::common::{make_rng, not_connected, uniform, MPS_TO_MPH};

/// 合成接收机报告的卫星数
const SYNTHETIC_SATELLITES: u32 = 8;

/// 合成接收机报告的定位模式 (3D)
const SYNTHETIC_FIX_MODE: u8 = 3;

/// 单圈周期非法时的回退值 (秒)
const FALLBACK_LAP_PERIOD_SEC: f64 = 120.0;

/// 有效定位判定：定位模式 >= 2D 且卫星数足够
pub fn fix_is_valid(fix_mode: u8, satellites: u32, min_satellites: u32) -> bool {
    fix_mode >= 2 && satellites >= min_satellites
}

/// 卫星定位合成适配器
pub struct SyntheticPosition {
    config: PositionConfig,
    rng: StdRng,
    started: Option<Instant>,
}

impl SyntheticPosition {
    pub fn new(config: &PositionConfig, seed: Option<u64>) -> Self {
        let mut config = config.clone();
        if !(config.lap_period_sec.is_finite() && config.lap_period_sec > 0.0) {
            warn!(
                lap_period_sec = config.lap_period_sec,
                fallback = FALLBACK_LAP_PERIOD_SEC,
                "Invalid synthetic lap period"
            );
            config.lap_period_sec = FALLBACK_LAP_PERIOD_SEC;
        }
        Self {
            config,
            rng: make_rng(seed),
            started: None,
        }
    }

    /// 某一时刻的读数
    fn reading_at(&mut self, elapsed_sec: f64) -> Reading {
        let cfg = &self.config;
        let angle = (elapsed_sec.rem_euclid(cfg.lap_period_sec) / cfg.lap_period_sec) * TAU;

        let lat = cfg.origin_lat + cfg.track_radius_deg * angle.cos();
        let lon = cfg.origin_lon + cfg.track_radius_deg * angle.sin();
        // 直道快、弯道慢
        let speed_mps = 20.0 + 15.0 * (angle * 2.0).sin().abs();
        let heading = angle.to_degrees().rem_euclid(360.0);
        let valid = fix_is_valid(
            SYNTHETIC_FIX_MODE,
            SYNTHETIC_SATELLITES,
            cfg.min_satellites,
        );

        Reading::new()
            .with(columns::GPS_LAT, lat)
            .with(columns::GPS_LON, lon)
            .with(columns::GPS_ALT_M, 50.0 + uniform(&mut self.rng, -5.0, 5.0))
            .with(columns::GPS_SPEED_MPH, speed_mps * MPS_TO_MPH)
            .with(columns::GPS_HEADING, heading)
            .with(columns::GPS_SATELLITES, SYNTHETIC_SATELLITES as f64)
            .with(columns::GPS_VALID, if valid { 1.0 } else { 0.0 })
    }
}

impl SensorAdapter for SyntheticPosition {
    fn group(&self) -> SensorGroup {
        SensorGroup::Position
    }

    fn source_mode(&self) -> SourceMode {
        SourceMode::Synthetic
    }

    fn connect(&mut self) -> bool {
        if self.started.is_none() {
            info!(group = %self.group(), "Positioning running in synthetic mode");
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
        debug!(group = %self.group(), "Positioning disconnected");
        self.started = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_validity() {
        assert!(fix_is_valid(3, 8, 4));
        assert!(fix_is_valid(2, 4, 4));
        assert!(!fix_is_valid(1, 12, 4));
        assert!(!fix_is_valid(3, 3, 4));
    }

    #[test]
    fn test_track_returns_to_start_each_lap() {
        let config = PositionConfig::default();
        let mut gps = SyntheticPosition::new(&config, Some(1));
        let a = gps.reading_at(0.0);
        let b = gps.reading_at(config.lap_period_sec);
        assert!((a.get(columns::GPS_LAT).unwrap() - b.get(columns::GPS_LAT).unwrap()).abs() < 1e-9);
        assert!((a.get(columns::GPS_LON).unwrap() - b.get(columns::GPS_LON).unwrap()).abs() < 1e-9);

        let half = gps.reading_at(config.lap_period_sec / 2.0);
        let lat = half.get(columns::GPS_LAT).unwrap();
        assert!((lat - (config.origin_lat - config.track_radius_deg)).abs() < 1e-9);
    }

    #[test]
    fn test_min_satellites_marks_fix_invalid() {
        let config = PositionConfig {
            min_satellites: 12,
            ..Default::default()
        };
        let mut gps = SyntheticPosition::new(&config, Some(1));
        gps.connect();
        let reading = gps.read().unwrap();
        assert_eq!(reading.get(columns::GPS_VALID), Some(0.0));
    }

    #[test]
    fn test_speed_range() {
        let mut gps = SyntheticPosition::new(&PositionConfig::default(), Some(2));
        for t in 0..120 {
            let mph = gps.reading_at(t as f64).get(columns::GPS_SPEED_MPH).unwrap();
            assert!((20.0 * MPS_TO_MPH - 1e-9..=35.0 * MPS_TO_MPH + 1e-9).contains(&mph));
        }
    }

    #[test]
    fn test_zero_lap_period_still_yields_coordinates() {
        let config = PositionConfig {
            lap_period_sec: 0.0,
            ..Default::default()
        };
        let mut gps = SyntheticPosition::new(&config, Some(3));
        for t in [0.0, 0.5, 60.0] {
            let reading = gps.reading_at(t);
            assert!(reading.get(columns::GPS_LAT).is_some_and(f64::is_finite));
            assert!(reading.get(columns::GPS_LON).is_some_and(f64::is_finite));
        }
    }
}
