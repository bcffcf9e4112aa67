//! DaqBlueprint - Config Loader 输出
//!
//! 描述完整的采集配置：车辆元数据、采集节拍、存储、传感器、分析阈值。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::SourceMode;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的采集配置蓝图
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaqBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 车辆元数据
    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// 采集节拍
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// 会话存储
    #[serde(default)]
    pub storage: StorageConfig,

    /// 传感器配置
    #[serde(default)]
    pub sensors: SensorsConfig,

    /// 事件分析阈值
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// 车辆元数据，原样写入 SessionSummary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// 显示名称
    #[serde(default = "default_vehicle_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,

    /// 整备质量 (kg)，功率估算使用
    #[serde(default = "default_mass_kg")]
    pub mass_kg: f64,

    /// 自由格式的附加信息
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

fn default_vehicle_name() -> String {
    "vehicle".to_string()
}

fn default_mass_kg() -> f64 {
    1549.0
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            name: default_vehicle_name(),
            make: None,
            model: None,
            year: None,
            mass_kg: default_mass_kg(),
            metadata: BTreeMap::new(),
        }
    }
}

/// 采集调度配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// 目标采样率 (Hz)
    #[serde(default = "default_target_rate_hz")]
    pub target_rate_hz: f64,

    /// 状态日志间隔 (秒)
    #[serde(default = "default_status_interval_sec")]
    pub status_interval_sec: f64,

    /// 数据源模式，启动时一次性决定
    #[serde(default)]
    pub source_mode: SourceMode,

    /// 任一适配器连接失败即拒绝启动
    #[serde(default)]
    pub require_all_sensors: bool,

    /// 实时快照推送频率 (Hz)
    #[serde(default = "default_live_push_rate_hz")]
    pub live_push_rate_hz: f64,

    /// 采样数上限 (None = 不限)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_samples: Option<u64>,

    /// 时长上限 (秒, None = 不限)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_sec: Option<f64>,
}

fn default_target_rate_hz() -> f64 {
    50.0
}

fn default_status_interval_sec() -> f64 {
    10.0
}

fn default_live_push_rate_hz() -> f64 {
    10.0
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            target_rate_hz: default_target_rate_hz(),
            status_interval_sec: default_status_interval_sec(),
            source_mode: SourceMode::default(),
            require_all_sensors: false,
            live_push_rate_hz: default_live_push_rate_hz(),
            max_samples: None,
            max_duration_sec: None,
        }
    }
}

/// 会话存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 会话根目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// 批量刷写阈值
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// 刷写失败时内存中最多保留的样本数，超过即视为存储不可写
    #[serde(default = "default_max_pending_samples")]
    pub max_pending_samples: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/sessions")
}

fn default_batch_size() -> usize {
    100
}

fn default_max_pending_samples() -> usize {
    10_000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            batch_size: default_batch_size(),
            max_pending_samples: default_max_pending_samples(),
        }
    }
}

/// 各传感器组配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorsConfig {
    #[serde(default)]
    pub vehicle_bus: VehicleBusConfig,

    #[serde(default)]
    pub inertial: InertialConfig,

    #[serde(default)]
    pub position: PositionConfig,

    #[serde(default)]
    pub temperature: TemperatureConfig,
}

fn default_true() -> bool {
    true
}

/// 车辆总线 (OBD) 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleBusConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 连接超时 (毫秒)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// 设备端口 (None = 自动探测)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for VehicleBusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            connect_timeout_ms: default_connect_timeout_ms(),
            port: None,
        }
    }
}

/// 惯性传感器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InertialConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 加速度零偏 (m/s²)
    #[serde(default)]
    pub accel_offset: [f64; 3],

    /// 陀螺零偏 (rad/s)
    #[serde(default)]
    pub gyro_offset: [f64; 3],

    /// 安装旋转矩阵 (传感器坐标 -> 车辆坐标，行优先)
    #[serde(default = "identity_rotation")]
    pub rotation: [[f64; 3]; 3],

    /// 互补滤波系数
    #[serde(default = "default_filter_alpha")]
    pub filter_alpha: f64,
}

fn identity_rotation() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

fn default_filter_alpha() -> f64 {
    0.98
}

impl Default for InertialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            accel_offset: [0.0; 3],
            gyro_offset: [0.0; 3],
            rotation: identity_rotation(),
            filter_alpha: default_filter_alpha(),
        }
    }
}

/// 卫星定位配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 有效定位所需的最少卫星数
    #[serde(default = "default_min_satellites")]
    pub min_satellites: u32,

    /// 合成赛道中心纬度
    #[serde(default = "default_origin_lat")]
    pub origin_lat: f64,

    /// 合成赛道中心经度
    #[serde(default = "default_origin_lon")]
    pub origin_lon: f64,

    /// 合成赛道半径 (度)
    #[serde(default = "default_track_radius_deg")]
    pub track_radius_deg: f64,

    /// 合成单圈周期 (秒)
    #[serde(default = "default_lap_period_sec")]
    pub lap_period_sec: f64,
}

fn default_min_satellites() -> u32 {
    4
}

fn default_origin_lat() -> f64 {
    37.7749
}

fn default_origin_lon() -> f64 {
    -122.4194
}

fn default_track_radius_deg() -> f64 {
    0.002
}

fn default_lap_period_sec() -> f64 {
    120.0
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_satellites: default_min_satellites(),
            origin_lat: default_origin_lat(),
            origin_lon: default_origin_lon(),
            track_radius_deg: default_track_radius_deg(),
            lap_period_sec: default_lap_period_sec(),
        }
    }
}

/// 温度探头组配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 探头列表
    #[serde(default = "default_probes")]
    pub probes: Vec<ProbeConfig>,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probes: default_probes(),
        }
    }
}

/// 单个温度探头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// 探头标识 (e.g. "oil")
    pub id: String,

    /// 输出列名 (必须以 temp_ 开头)
    pub column: String,

    /// 预警阈值 (°F)
    pub warning_f: f64,

    /// 危险阈值 (°F)
    pub critical_f: f64,

    /// 合成模式下的基准温度 (°F)
    #[serde(default = "default_base_f")]
    pub base_f: f64,
}

fn default_base_f() -> f64 {
    75.0
}

impl ProbeConfig {
    pub fn new(id: &str, column: &str, warning_f: f64, critical_f: f64, base_f: f64) -> Self {
        Self {
            id: id.to_string(),
            column: column.to_string(),
            warning_f,
            critical_f,
            base_f,
        }
    }
}

fn default_probes() -> Vec<ProbeConfig> {
    vec![
        ProbeConfig::new("oil", "temp_oil_f", 280.0, 300.0, 190.0),
        ProbeConfig::new("intake", "temp_intake_f", 140.0, 160.0, 80.0),
        ProbeConfig::new("brake", "temp_brake_f", 250.0, 300.0, 180.0),
        ProbeConfig::new("trans", "temp_trans_f", 240.0, 260.0, 195.0),
        ProbeConfig::new("ambient", "temp_ambient_f", 998.0, 999.0, 75.0),
    ]
}

/// 经纬度坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// 事件分析阈值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 加速段起步阈值 (mph)
    #[serde(default = "default_accel_low_mph")]
    pub accel_low_mph: f64,

    /// 加速段完成阈值 (mph)
    #[serde(default = "default_high_mph")]
    pub accel_high_mph: f64,

    /// 制动段起始阈值 (mph)
    #[serde(default = "default_high_mph")]
    pub brake_high_mph: f64,

    /// 制动段完成阈值 (mph)
    #[serde(default = "default_brake_low_mph")]
    pub brake_low_mph: f64,

    /// 四分之一英里重新起算的低速阈值 (mph)
    #[serde(default = "default_accel_low_mph")]
    pub quarter_mile_restart_mph: f64,

    /// 四分之一英里有效时长上限 (秒)
    #[serde(default = "default_quarter_mile_ceiling_sec")]
    pub quarter_mile_ceiling_sec: f64,

    /// 起终点判定半径 (米)
    #[serde(default = "default_lap_threshold_m")]
    pub lap_threshold_m: f64,

    /// 起终点坐标 (None = 首个有效定位)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_finish: Option<Coordinate>,

    /// 功率/扭矩估算
    #[serde(default)]
    pub power: PowerConfig,
}

fn default_accel_low_mph() -> f64 {
    10.0
}

fn default_high_mph() -> f64 {
    60.0
}

fn default_brake_low_mph() -> f64 {
    5.0
}

fn default_quarter_mile_ceiling_sec() -> f64 {
    30.0
}

fn default_lap_threshold_m() -> f64 {
    50.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            accel_low_mph: default_accel_low_mph(),
            accel_high_mph: default_high_mph(),
            brake_high_mph: default_high_mph(),
            brake_low_mph: default_brake_low_mph(),
            quarter_mile_restart_mph: default_accel_low_mph(),
            quarter_mile_ceiling_sec: default_quarter_mile_ceiling_sec(),
            lap_threshold_m: default_lap_threshold_m(),
            start_finish: None,
            power: PowerConfig::default(),
        }
    }
}

/// 功率/扭矩估算参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    /// 纵向加速度下限 (g)
    #[serde(default = "default_min_accel_g")]
    pub min_accel_g: f64,

    /// 转速下限 (rpm)
    #[serde(default = "default_min_rpm")]
    pub min_rpm: f64,

    /// 转速分箱宽度
    #[serde(default = "default_bin_width_rpm")]
    pub bin_width_rpm: f64,

    /// 最高分箱上界
    #[serde(default = "default_max_rpm")]
    pub max_rpm: f64,
}

fn default_min_accel_g() -> f64 {
    0.1
}

fn default_min_rpm() -> f64 {
    1000.0
}

fn default_bin_width_rpm() -> f64 {
    500.0
}

fn default_max_rpm() -> f64 {
    8000.0
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            min_accel_g: default_min_accel_g(),
            min_rpm: default_min_rpm(),
            bin_width_rpm: default_bin_width_rpm(),
            max_rpm: default_max_rpm(),
        }
    }
}
