//! Full performance report for one session

use std::fs;
use std::path::Path;

use contracts::{AnalysisConfig, SessionRecord, VehicleConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::AnalysisError;
use crate::laps::{summarize_laps, LapSummary};
use crate::max_values::{max_values, MaxValues};
use crate::power::{estimate_power_curve, PowerCurve};
use crate::quarter_mile::{analyze_quarter_mile, QuarterMileReport};
use crate::runs::{analyze_acceleration, analyze_braking, RunReport};

/// Report file name inside a session directory
pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOverview {
    pub session_id: String,
    pub total_samples: usize,
    pub duration_seconds: f64,
}

/// Every section is always present; absent events carry `found: false`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub session_info: SessionOverview,
    pub zero_to_sixty: RunReport,
    pub sixty_to_zero: RunReport,
    pub quarter_mile: QuarterMileReport,
    pub max_values: MaxValues,
    pub laps: LapSummary,
    pub power_curve: PowerCurve,
}

#[instrument(
    name = "generate_report",
    skip_all,
    fields(session = %record.session_id, samples = record.len())
)]
pub fn generate_report(
    record: &SessionRecord,
    config: &AnalysisConfig,
    vehicle: &VehicleConfig,
) -> Report {
    let report = Report {
        session_info: SessionOverview {
            session_id: record.session_id.clone(),
            total_samples: record.len(),
            duration_seconds: record.duration_seconds().unwrap_or(0.0),
        },
        zero_to_sixty: analyze_acceleration(record, config),
        sixty_to_zero: analyze_braking(record, config),
        quarter_mile: analyze_quarter_mile(record, config),
        max_values: max_values(record),
        laps: summarize_laps(record, config),
        power_curve: estimate_power_curve(record, vehicle, &config.power),
    };

    info!(
        zero_to_sixty = report.zero_to_sixty.found,
        sixty_to_zero = report.sixty_to_zero.found,
        quarter_mile = report.quarter_mile.found,
        laps = report.laps.num_laps,
        power_bins = report.power_curve.bins.len(),
        "Report generated"
    );
    report
}

impl Report {
    pub fn to_json_pretty(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(self).map_err(|e| AnalysisError::serialize(e.to_string()))
    }

    pub fn write_to(&self, path: &Path) -> Result<(), AnalysisError> {
        fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = &self.session_info;
        writeln!(f, "=== Performance Report: {} ===", info.session_id)?;
        writeln!(
            f,
            "Samples: {}  Duration: {:.1} s",
            info.total_samples, info.duration_seconds
        )?;

        write_run(f, "0-60 mph", &self.zero_to_sixty)?;
        write_run(f, "60-0 mph", &self.sixty_to_zero)?;
        if let Some(d) = self.sixty_to_zero.distance_ft {
            writeln!(f, "  Est. distance: {d:.1} ft")?;
        }

        match (self.quarter_mile.time, self.quarter_mile.trap_speed_mph) {
            (Some(t), Some(v)) => writeln!(f, "1/4 mile: {t:.2} s @ {v:.1} mph")?,
            (Some(t), None) => writeln!(f, "1/4 mile: {t:.2} s")?,
            _ => writeln!(f, "1/4 mile: not found")?,
        }

        let max = &self.max_values;
        writeln!(f, "Peaks:")?;
        let peaks = [
            ("speed (mph)", max.max_speed_mph),
            ("rpm", max.max_rpm),
            ("accel (g)", max.max_accel_g),
            ("braking (g)", max.max_braking_g),
            ("lateral (g)", max.max_lateral_g),
            ("total (g)", max.max_total_g),
        ];
        for (name, value) in peaks {
            if let Some(v) = value {
                writeln!(f, "  {name}: {v:.2}")?;
            }
        }
        for (column, v) in &max.temperatures {
            writeln!(f, "  {column}: {v:.1}")?;
        }

        if self.laps.num_laps > 0 {
            writeln!(f, "Laps: {}", self.laps.num_laps)?;
            for lap in &self.laps.laps {
                match lap.lap_time {
                    Some(t) => writeln!(f, "  Lap {}: {t:.2} s", lap.lap_number)?,
                    None => writeln!(f, "  Lap {}: n/a", lap.lap_number)?,
                }
            }
            if let Some(best) = self.laps.best_lap_time {
                writeln!(f, "  Best: {best:.2} s")?;
            }
        }

        if let (Some(hp), Some(tq)) = (self.power_curve.peak_hp, self.power_curve.peak_torque) {
            writeln!(
                f,
                "Est. peak power: {:.0} hp ({:.0}-{:.0} rpm), torque: {:.0} lb-ft ({:.0}-{:.0} rpm)",
                hp.value, hp.rpm_low, hp.rpm_high, tq.value, tq.rpm_low, tq.rpm_high
            )?;
        }
        Ok(())
    }
}

fn write_run(f: &mut std::fmt::Formatter<'_>, name: &str, run: &RunReport) -> std::fmt::Result {
    match run.time {
        Some(t) => {
            write!(f, "{name}: {t:.2} s (best of {})", run.num_runs)?;
            if let Some(g) = run.avg_g {
                write!(f, ", avg {g:.2} g")?;
            }
            if let Some(g) = run.max_g {
                write!(f, ", peak {g:.2} g")?;
            }
            writeln!(f)
        }
        None => writeln!(f, "{name}: not found"),
    }
}
