//! # Analysis
//!
//! 离线运动学事件分析：基于已记录的会话数据流计算性能指标。
//!
//! ## 功能
//!
//! - 加速 / 制动区间检测 (0-60, 60-0) 与制动距离估算
//! - 四分之一英里成绩与末速
//! - 起终点地理围栏计圈
//! - 功率 / 扭矩曲线估算
//! - 全程峰值、会话对比
//!
//! 所有分析只读 `SessionRecord`，派生序列保存在各自的缓冲区中。
//!
//! ## 使用示例
//!
//! ```ignore
//! use analysis::generate_report;
//!
//! let record = recorder::load_dir(&session_path)?;
//! let report = generate_report(&record, &blueprint.analysis, &blueprint.vehicle);
//! println!("{report}");
//! ```

pub mod compare;
pub mod error;
pub mod geo;
pub mod laps;
pub mod max_values;
pub mod power;
pub mod quarter_mile;
pub mod report;
pub mod runs;
mod series;
pub mod units;

pub use compare::{compare_sessions, MetricComparison, SessionComparison, COMPARED_METRICS};
pub use error::AnalysisError;
pub use geo::{cumulative_distance, haversine, EARTH_RADIUS_M};
pub use laps::{crossings, detect_laps, distance_from, summarize_laps, Lap, LapSummary};
pub use max_values::{max_values, MaxValues};
pub use power::{
    estimate_hp, estimate_power_curve, estimate_torque, PowerBin, PowerCurve, PowerPeak,
};
pub use quarter_mile::{analyze_quarter_mile, QuarterMileReport};
pub use report::{generate_report, Report, SessionOverview, REPORT_FILE};
pub use runs::{
    analyze_acceleration, analyze_braking, braking_distance_m, detect_runs, Run, RunKind,
    RunReport,
};
