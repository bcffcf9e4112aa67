//! 惯性传感器标定
//!
//! - 零偏扣除 + 安装旋转 (传感器坐标 -> 车辆坐标: X 前, Y 左, Z 上)
//! - g 值换算 (垂向扣除 1g 静态分量)
//! - 互补滤波估计俯仰/侧倾
//! - 静止零点标定

use nalgebra::{Matrix3, Vector3};
use tracing::{info, warn};

use contracts::InertialConfig;

use crate::error::{IngestionError, Result};

/// 标准重力加速度 (m/s²)
pub const GRAVITY: f64 = 9.80665;

/// 零点标定所需最少静止样本数
pub const MIN_CALIBRATION_SAMPLES: usize = 10;

/// 加速度噪声告警阈值 (各轴标准差的范数, m/s²)
pub const NOISE_WARN_THRESHOLD: f64 = 0.5;

/// 车辆坐标系下的 g 值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GForces {
    pub longitudinal: f64,
    pub lateral: f64,
    pub vertical: f64,
    pub total: f64,
}

/// 标定后的坐标变换
#[derive(Debug, Clone)]
pub struct InertialFrame {
    accel_offset: Vector3<f64>,
    gyro_offset: Vector3<f64>,
    rotation: Matrix3<f64>,
}

impl InertialFrame {
    pub fn from_config(config: &InertialConfig) -> Self {
        let r = &config.rotation;
        Self {
            accel_offset: Vector3::from(config.accel_offset),
            gyro_offset: Vector3::from(config.gyro_offset),
            rotation: Matrix3::new(
                r[0][0], r[0][1], r[0][2], //
                r[1][0], r[1][1], r[1][2], //
                r[2][0], r[2][1], r[2][2],
            ),
        }
    }

    /// 原始读数 -> 车辆坐标 (m/s², rad/s)
    pub fn to_vehicle(
        &self,
        accel_raw: Vector3<f64>,
        gyro_raw: Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let accel = self.rotation * (accel_raw - self.accel_offset);
        let gyro = self.rotation * (gyro_raw - self.gyro_offset);
        (accel, gyro)
    }

    /// 车辆坐标加速度 -> g 值
    pub fn g_forces(accel: &Vector3<f64>) -> GForces {
        let longitudinal = accel.x / GRAVITY;
        let lateral = accel.y / GRAVITY;
        let vertical = (accel.z - GRAVITY) / GRAVITY;
        GForces {
            longitudinal,
            lateral,
            vertical,
            total: (longitudinal.powi(2) + lateral.powi(2) + vertical.powi(2)).sqrt(),
        }
    }
}

/// 互补滤波器
///
/// 陀螺积分负责短期，加速度计倾角负责长期。
#[derive(Debug, Clone)]
pub struct ComplementaryFilter {
    alpha: f64,
    pitch: f64,
    roll: f64,
}

impl ComplementaryFilter {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    /// 更新并返回 (pitch_deg, roll_deg)
    pub fn update(&mut self, accel: &Vector3<f64>, gyro: &Vector3<f64>, dt: f64) -> (f64, f64) {
        let accel_pitch = accel.x.atan2((accel.y.powi(2) + accel.z.powi(2)).sqrt());
        let accel_roll = accel.y.atan2((accel.x.powi(2) + accel.z.powi(2)).sqrt());

        let gyro_pitch = self.pitch + gyro.y * dt;
        let gyro_roll = self.roll + gyro.x * dt;

        self.pitch = self.alpha * gyro_pitch + (1.0 - self.alpha) * accel_pitch;
        self.roll = self.alpha * gyro_roll + (1.0 - self.alpha) * accel_roll;

        (self.pitch.to_degrees(), self.roll.to_degrees())
    }
}

/// 静止零点标定结果
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroPointCalibration {
    /// 加速度零偏 (m/s²)
    pub accel_offset: [f64; 3],
    /// 陀螺零偏 (rad/s)
    pub gyro_offset: [f64; 3],
    /// 加速度噪声 (各轴总体标准差的范数)
    pub accel_noise: f64,
}

impl ZeroPointCalibration {
    /// 由静止、水平放置时采集的 (accel, gyro) 原始样本计算零偏
    ///
    /// 静止时期望读数为 (0, 0, g) 与 (0, 0, 0)。
    pub fn from_stationary(samples: &[(Vector3<f64>, Vector3<f64>)]) -> Result<Self> {
        if samples.len() < MIN_CALIBRATION_SAMPLES {
            return Err(IngestionError::NotEnoughSamples {
                needed: MIN_CALIBRATION_SAMPLES,
                got: samples.len(),
            });
        }
        if let Some(index) = samples
            .iter()
            .position(|(a, g)| !a.iter().chain(g.iter()).all(|v| v.is_finite()))
        {
            return Err(IngestionError::NonFiniteSample { index });
        }

        let n = samples.len() as f64;
        let accel_mean = samples.iter().map(|(a, _)| a).sum::<Vector3<f64>>() / n;
        let gyro_mean = samples.iter().map(|(_, g)| g).sum::<Vector3<f64>>() / n;

        let variance = samples
            .iter()
            .map(|(a, _)| (a - accel_mean).component_mul(&(a - accel_mean)))
            .sum::<Vector3<f64>>()
            / n;
        let accel_noise = variance.map(f64::sqrt).norm();

        let accel_offset = accel_mean - Vector3::new(0.0, 0.0, GRAVITY);

        if accel_noise > NOISE_WARN_THRESHOLD {
            warn!(
                noise = accel_noise,
                "High accelerometer noise during calibration, vehicle may not be stationary"
            );
        }
        info!(
            accel_offset = ?accel_offset.as_slice(),
            gyro_offset = ?gyro_mean.as_slice(),
            samples = samples.len(),
            "Zero-point calibration complete"
        );

        Ok(Self {
            accel_offset: [accel_offset.x, accel_offset.y, accel_offset.z],
            gyro_offset: [gyro_mean.x, gyro_mean.y, gyro_mean.z],
            accel_noise,
        })
    }

    pub fn is_noisy(&self) -> bool {
        self.accel_noise > NOISE_WARN_THRESHOLD
    }

    /// 写回配置 (保留安装旋转)
    pub fn apply_to(&self, config: &mut InertialConfig) {
        config.accel_offset = self.accel_offset;
        config.gyro_offset = self.gyro_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_frame_passthrough() {
        let frame = InertialFrame::from_config(&InertialConfig::default());
        let (accel, gyro) =
            frame.to_vehicle(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(accel, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(gyro, Vector3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_offset_then_rotation() {
        let config = InertialConfig {
            accel_offset: [1.0, 0.0, 0.0],
            // 传感器 X 轴朝左安装
            rotation: [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            ..Default::default()
        };
        let frame = InertialFrame::from_config(&config);
        let (accel, _) = frame.to_vehicle(Vector3::new(3.0, 2.0, GRAVITY), Vector3::zeros());
        assert!(approx(accel.x, 2.0));
        assert!(approx(accel.y, 2.0));
        assert!(approx(accel.z, GRAVITY));
    }

    #[test]
    fn test_g_forces_at_rest() {
        let g = InertialFrame::g_forces(&Vector3::new(0.0, 0.0, GRAVITY));
        assert!(approx(g.longitudinal, 0.0));
        assert!(approx(g.vertical, 0.0));
        assert!(approx(g.total, 0.0));

        let g = InertialFrame::g_forces(&Vector3::new(0.3 * GRAVITY, -0.4 * GRAVITY, GRAVITY));
        assert!(approx(g.longitudinal, 0.3));
        assert!(approx(g.lateral, -0.4));
        assert!(approx(g.total, 0.5));
    }

    #[test]
    fn test_filter_converges_to_accel_tilt() {
        let mut filter = ComplementaryFilter::new(0.98);
        let accel = Vector3::new(0.0, 0.0, GRAVITY);
        let gyro = Vector3::zeros();
        let (pitch, roll) = filter.update(&accel, &gyro, 0.02);
        assert!(approx(pitch, 0.0));
        assert!(approx(roll, 0.0));
    }

    #[test]
    fn test_zero_point_calibration() {
        let samples: Vec<_> = (0..20)
            .map(|i| {
                let wobble = if i % 2 == 0 { 0.01 } else { -0.01 };
                (
                    Vector3::new(0.2 + wobble, -0.1, GRAVITY + 0.05),
                    Vector3::new(0.01, 0.0, -0.02),
                )
            })
            .collect();
        let cal = ZeroPointCalibration::from_stationary(&samples).unwrap();
        assert!((cal.accel_offset[0] - 0.2).abs() < 1e-9);
        assert!((cal.accel_offset[1] + 0.1).abs() < 1e-9);
        assert!((cal.accel_offset[2] - 0.05).abs() < 1e-9);
        assert!((cal.gyro_offset[2] + 0.02).abs() < 1e-12);
        assert!(!cal.is_noisy());

        let mut config = InertialConfig::default();
        cal.apply_to(&mut config);
        assert_eq!(config.accel_offset, cal.accel_offset);
    }

    #[test]
    fn test_calibration_rejects_short_input() {
        let samples = vec![(Vector3::zeros(), Vector3::zeros()); 3];
        let err = ZeroPointCalibration::from_stationary(&samples).unwrap_err();
        assert!(matches!(err, IngestionError::NotEnoughSamples { got: 3, .. }));
    }
}
