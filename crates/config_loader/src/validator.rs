//! 配置校验模块
//!
//! 校验规则：
//! - target_rate_hz / live_push_rate_hz / status_interval_sec 在允许范围内
//! - batch_size > 0，max_pending_samples >= batch_size
//! - 车辆质量 > 0
//! - 温度探头 id / 列名唯一，列名以 temp_ 开头，warning < critical
//! - 惯性滤波系数与旋转矩阵合法
//! - 合成位置的单圈周期 > 0
//! - 分析阈值有序

use std::collections::HashSet;

use contracts::{columns, ContractError, DaqBlueprint};

/// 采样频率范围 (Hz)
pub const RATE_RANGE_HZ: (f64, f64) = (0.01, 10_000.0);

/// 状态日志间隔上限 (秒)
pub const MAX_STATUS_INTERVAL_SEC: f64 = 86_400.0;

/// 校验 DaqBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    validate_acquisition(blueprint)?;
    validate_storage(blueprint)?;
    validate_vehicle(blueprint)?;
    validate_probes(blueprint)?;
    validate_inertial(blueprint)?;
    positive("sensors.position.lap_period_sec", blueprint.sensors.position.lap_period_sec)?;
    validate_analysis(blueprint)?;
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ContractError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ContractError::config_validation(
            field,
            format!("must be > 0, got {value}"),
        ));
    }
    Ok(())
}

fn in_range(field: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ContractError> {
    if !(value >= min && value <= max) {
        return Err(ContractError::config_validation(
            field,
            format!("must be in [{min}, {max}], got {value}"),
        ));
    }
    Ok(())
}

/// 校验采集节拍
fn validate_acquisition(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    let acq = &blueprint.acquisition;
    in_range("acquisition.target_rate_hz", acq.target_rate_hz, RATE_RANGE_HZ)?;
    positive("acquisition.status_interval_sec", acq.status_interval_sec)?;
    if acq.status_interval_sec > MAX_STATUS_INTERVAL_SEC {
        return Err(ContractError::config_validation(
            "acquisition.status_interval_sec",
            format!(
                "must be <= {MAX_STATUS_INTERVAL_SEC}, got {}",
                acq.status_interval_sec
            ),
        ));
    }
    in_range("acquisition.live_push_rate_hz", acq.live_push_rate_hz, RATE_RANGE_HZ)?;
    if let Some(limit) = acq.max_duration_sec {
        positive("acquisition.max_duration_sec", limit)?;
    }
    Ok(())
}

/// 校验存储配置
fn validate_storage(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    let storage = &blueprint.storage;
    if storage.batch_size == 0 {
        return Err(ContractError::config_validation(
            "storage.batch_size",
            "batch_size must be > 0",
        ));
    }
    if storage.max_pending_samples < storage.batch_size {
        return Err(ContractError::config_validation(
            "storage.max_pending_samples",
            format!(
                "max_pending_samples ({}) must be >= batch_size ({})",
                storage.max_pending_samples, storage.batch_size
            ),
        ));
    }
    if storage.data_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "storage.data_dir",
            "data_dir cannot be empty",
        ));
    }
    Ok(())
}

/// 校验车辆元数据
fn validate_vehicle(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    positive("vehicle.mass_kg", blueprint.vehicle.mass_kg)
}

/// 校验温度探头
fn validate_probes(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    let mut ids = HashSet::new();
    let mut cols = HashSet::new();

    for probe in &blueprint.sensors.temperature.probes {
        if !ids.insert(probe.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("sensors.temperature.probes[id={}]", probe.id),
                "duplicate probe id",
            ));
        }
        if !cols.insert(probe.column.as_str()) {
            return Err(ContractError::config_validation(
                format!("sensors.temperature.probes[{}].column", probe.id),
                format!("duplicate probe column '{}'", probe.column),
            ));
        }
        if !probe.column.starts_with(columns::TEMP_PREFIX) {
            return Err(ContractError::config_validation(
                format!("sensors.temperature.probes[{}].column", probe.id),
                format!(
                    "column '{}' must start with '{}'",
                    probe.column,
                    columns::TEMP_PREFIX
                ),
            ));
        }
        if probe.warning_f >= probe.critical_f {
            return Err(ContractError::config_validation(
                format!("sensors.temperature.probes[{}]", probe.id),
                format!(
                    "warning_f ({}) must be < critical_f ({})",
                    probe.warning_f, probe.critical_f
                ),
            ));
        }
    }
    Ok(())
}

/// 校验惯性传感器标定
fn validate_inertial(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    let inertial = &blueprint.sensors.inertial;

    if !(inertial.filter_alpha > 0.0 && inertial.filter_alpha <= 1.0) {
        return Err(ContractError::config_validation(
            "sensors.inertial.filter_alpha",
            format!("filter_alpha must be in (0, 1], got {}", inertial.filter_alpha),
        ));
    }

    let all_finite = inertial
        .rotation
        .iter()
        .flatten()
        .chain(inertial.accel_offset.iter())
        .chain(inertial.gyro_offset.iter())
        .all(|v| v.is_finite());
    if !all_finite {
        return Err(ContractError::config_validation(
            "sensors.inertial",
            "calibration values must be finite",
        ));
    }
    Ok(())
}

/// 校验分析阈值
fn validate_analysis(blueprint: &DaqBlueprint) -> Result<(), ContractError> {
    let a = &blueprint.analysis;

    if a.accel_low_mph >= a.accel_high_mph {
        return Err(ContractError::config_validation(
            "analysis.accel_low_mph / analysis.accel_high_mph",
            format!(
                "accel_low_mph ({}) must be < accel_high_mph ({})",
                a.accel_low_mph, a.accel_high_mph
            ),
        ));
    }
    if a.brake_low_mph >= a.brake_high_mph {
        return Err(ContractError::config_validation(
            "analysis.brake_low_mph / analysis.brake_high_mph",
            format!(
                "brake_low_mph ({}) must be < brake_high_mph ({})",
                a.brake_low_mph, a.brake_high_mph
            ),
        ));
    }
    positive("analysis.quarter_mile_ceiling_sec", a.quarter_mile_ceiling_sec)?;
    positive("analysis.lap_threshold_m", a.lap_threshold_m)?;
    positive("analysis.power.bin_width_rpm", a.power.bin_width_rpm)?;

    if a.power.min_rpm >= a.power.max_rpm {
        return Err(ContractError::config_validation(
            "analysis.power.min_rpm / analysis.power.max_rpm",
            format!(
                "min_rpm ({}) must be < max_rpm ({})",
                a.power.min_rpm, a.power.max_rpm
            ),
        ));
    }

    if let Some(point) = a.start_finish {
        if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
            return Err(ContractError::config_validation(
                "analysis.start_finish",
                format!("coordinate out of range: ({}, {})", point.lat, point.lon),
            ));
        }
    }
    Ok(())
}
