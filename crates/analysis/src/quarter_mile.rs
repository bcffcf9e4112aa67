//! Quarter-mile (402.336 m) elapsed time and trap speed

use contracts::{columns, AnalysisConfig, SessionRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::cumulative_distance;
use crate::series;
use crate::units::QUARTER_MILE_M;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterMileReport {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    /// Speed at the sample that completed the distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trap_speed_mph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_idx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_idx: Option<usize>,
}

/// Best quarter-mile over every near-standstill start
///
/// Any sample slower than the restart speed is a candidate start. The end is
/// the first sample whose cumulative distance reaches start + 402.336 m.
/// Candidates overlap freely; the shortest one under the ceiling wins.
pub fn analyze_quarter_mile(record: &SessionRecord, config: &AnalysisConfig) -> QuarterMileReport {
    let has_columns = [columns::SPEED_MPH, columns::GPS_LAT, columns::GPS_LON]
        .iter()
        .all(|c| record.has_column(c));
    if !has_columns || record.is_empty() {
        return QuarterMileReport::default();
    }

    let speed = series::column(record, columns::SPEED_MPH);
    let elapsed = series::column(record, columns::ELAPSED_TIME);
    let distance = cumulative_distance(record);

    let mut best: Option<(usize, usize, f64)> = None;
    for (i, v) in speed.iter().enumerate() {
        if !matches!(v, Some(v) if *v < config.quarter_mile_restart_mph) {
            continue;
        }
        let target = distance[i] + QUARTER_MILE_M;
        // distance is non-decreasing
        let j = distance.partition_point(|d| *d < target);
        if j >= distance.len() {
            // later starts only need more distance
            break;
        }
        let (Some(t0), Some(t1)) = (elapsed[i], elapsed[j]) else {
            continue;
        };
        let duration = t1 - t0;
        if duration >= config.quarter_mile_ceiling_sec {
            continue;
        }
        if best.map_or(true, |(_, _, b)| duration < b) {
            best = Some((i, j, duration));
        }
    }

    match best {
        Some((start, end, time)) => {
            debug!(start, end, time, "Quarter mile found");
            QuarterMileReport {
                found: true,
                time: Some(time),
                trap_speed_mph: speed[end],
                start_idx: Some(start),
                end_idx: Some(end),
            }
        }
        None => QuarterMileReport::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_M;
    use contracts::{Reading, SensorGroup, SensorSample};

    /// Straight north run at constant 10 m per sample
    fn drag_strip(speeds: &[f64], dt: f64) -> SessionRecord {
        let deg_per_m = 1.0 / (EARTH_RADIUS_M * 1f64.to_radians());
        let samples = speeds
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut s = SensorSample::new(None, Some(i as f64 * dt));
                s.merge(SensorGroup::VehicleBus, Reading::new().with("speed_mph", *v));
                s.merge(
                    SensorGroup::Position,
                    Reading::new()
                        .with("gps_lat", i as f64 * 10.0 * deg_per_m)
                        .with("gps_lon", 0.0)
                        .with("gps_valid", 1.0),
                );
                s
            })
            .collect();
        SessionRecord::from_samples("qm", samples)
    }

    #[test]
    fn test_quarter_mile_from_standstill() {
        // 60 samples * 10 m = 590 m of track; first sample is the only slow one
        let mut speeds = vec![80.0; 60];
        speeds[0] = 0.0;
        let report = analyze_quarter_mile(&drag_strip(&speeds, 0.5), &AnalysisConfig::default());

        assert!(report.found);
        // 402.336 m needs 41 segments of 10 m
        assert_eq!(report.end_idx, Some(41));
        assert!((report.time.unwrap() - 20.5).abs() < 1e-9);
        assert_eq!(report.trap_speed_mph, Some(80.0));
    }

    #[test]
    fn test_ceiling_rejects_slow_runs() {
        let mut speeds = vec![80.0; 60];
        speeds[0] = 0.0;
        let report = analyze_quarter_mile(&drag_strip(&speeds, 1.0), &AnalysisConfig::default());
        assert!(!report.found);
        assert!(report.time.is_none());
    }

    #[test]
    fn test_too_short_or_no_gps() {
        let report = analyze_quarter_mile(&drag_strip(&[0.0; 10], 0.1), &AnalysisConfig::default());
        assert!(!report.found);

        let mut record = drag_strip(&[0.0; 10], 0.1);
        record.columns.retain(|c| c != "gps_lat");
        assert!(!analyze_quarter_mile(&record, &AnalysisConfig::default()).found);
    }
}
