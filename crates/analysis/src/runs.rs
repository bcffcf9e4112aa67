//! Acceleration / braking run detection
//!
//! Two-state machine over the speed series. While waiting, the entry
//! condition arms a run; while in a run, seeing the entry condition again
//! moves the start forward, so a run always spans the last sample on the
//! entry side to the first sample past the exit threshold.

use contracts::{columns, AnalysisConfig, SessionRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::series;
use crate::units::{GRAVITY, MPH_TO_MPS, M_TO_FT};

/// Run direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// low -> high
    Acceleration,
    /// high -> low
    Braking,
}

/// One completed run (indices into the record)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub start_idx: usize,
    pub end_idx: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    WaitingForEntry,
    InRun { start: usize },
}

/// Find every completed run
///
/// Samples without a speed value are skipped. A run whose start or end lacks
/// an elapsed time is discarded.
pub fn detect_runs(
    speed: &[Option<f64>],
    elapsed: &[Option<f64>],
    kind: RunKind,
    low: f64,
    high: f64,
) -> Vec<Run> {
    let entry = |v: f64| match kind {
        RunKind::Acceleration => v < low,
        RunKind::Braking => v > high,
    };
    let exit = |v: f64| match kind {
        RunKind::Acceleration => v >= high,
        RunKind::Braking => v < low,
    };

    let mut runs = Vec::new();
    let mut state = RunState::WaitingForEntry;

    for (i, v) in speed.iter().enumerate() {
        let Some(v) = *v else { continue };
        state = match state {
            RunState::WaitingForEntry if entry(v) => RunState::InRun { start: i },
            RunState::WaitingForEntry => RunState::WaitingForEntry,
            RunState::InRun { .. } if entry(v) => RunState::InRun { start: i },
            RunState::InRun { start } if exit(v) => {
                let times = (
                    elapsed.get(start).copied().flatten(),
                    elapsed.get(i).copied().flatten(),
                );
                if let (Some(start_time), Some(end_time)) = times {
                    runs.push(Run {
                        start_idx: start,
                        end_idx: i,
                        start_time,
                        end_time,
                        duration: end_time - start_time,
                    });
                }
                RunState::WaitingForEntry
            }
            in_run => in_run,
        };
    }
    runs
}

/// Report section for a run type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub found: bool,
    /// Best (minimum) duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    pub all_times: Vec<f64>,
    pub num_runs: usize,
    /// Mean longitudinal g over the best run (magnitude for braking)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_g: Option<f64>,
    /// Peak longitudinal g over the best run (magnitude for braking)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_g: Option<f64>,
    /// Analytic stopping distance, braking only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_ft: Option<f64>,
    #[serde(skip)]
    pub best: Option<Run>,
}

impl RunReport {
    pub fn not_found() -> Self {
        Self::default()
    }
}

fn best_run(runs: &[Run]) -> Option<Run> {
    runs.iter()
        .copied()
        .reduce(|best, r| if r.duration < best.duration { r } else { best })
}

fn analyze(record: &SessionRecord, kind: RunKind, low: f64, high: f64) -> RunReport {
    if !record.has_column(columns::SPEED_MPH) {
        debug!(kind = ?kind, "No speed column, skipping run detection");
        return RunReport::not_found();
    }

    let speed = series::column(record, columns::SPEED_MPH);
    let elapsed = series::column(record, columns::ELAPSED_TIME);
    let runs = detect_runs(&speed, &elapsed, kind, low, high);
    let Some(best) = best_run(&runs) else {
        debug!(kind = ?kind, "No complete run");
        return RunReport::not_found();
    };

    let accel = series::column(record, columns::ACCEL_LONG_G);
    let window = &accel[best.start_idx..best.end_idx];
    let (avg_g, max_g) = match kind {
        RunKind::Acceleration => (series::mean(window), series::max(window)),
        RunKind::Braking => (
            series::mean(window).map(f64::abs),
            series::min(window).map(f64::abs),
        ),
    };

    info!(kind = ?kind, runs = runs.len(), best_s = best.duration, "Runs detected");
    RunReport {
        found: true,
        time: Some(best.duration),
        all_times: runs.iter().map(|r| r.duration).collect(),
        num_runs: runs.len(),
        avg_g,
        max_g,
        distance_m: None,
        distance_ft: None,
        best: Some(best),
    }
}

/// Stopping distance d = v² / (2a) from the entry speed and mean deceleration
pub fn braking_distance_m(high_mph: f64, avg_decel_g: f64) -> Option<f64> {
    let a = avg_decel_g.abs() * GRAVITY;
    if a <= 0.0 || !a.is_finite() {
        return None;
    }
    let v = high_mph * MPH_TO_MPS;
    Some(v * v / (2.0 * a))
}

/// Acceleration runs (default 10 -> 60 mph)
pub fn analyze_acceleration(record: &SessionRecord, config: &AnalysisConfig) -> RunReport {
    analyze(
        record,
        RunKind::Acceleration,
        config.accel_low_mph,
        config.accel_high_mph,
    )
}

/// Braking runs (default 60 -> 5 mph) plus analytic stopping distance
pub fn analyze_braking(record: &SessionRecord, config: &AnalysisConfig) -> RunReport {
    let mut report = analyze(
        record,
        RunKind::Braking,
        config.brake_low_mph,
        config.brake_high_mph,
    );
    if let Some(distance) = report
        .avg_g
        .and_then(|g| braking_distance_m(config.brake_high_mph, g))
    {
        report.distance_m = Some(distance);
        report.distance_ft = Some(distance * M_TO_FT);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Reading, SensorGroup, SensorSample};

    fn record(speeds: &[Option<f64>], accel: Option<&[f64]>, dt: f64) -> SessionRecord {
        let samples = speeds
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut s = SensorSample::new(None, Some(i as f64 * dt));
                s.merge(SensorGroup::VehicleBus, Reading::new().with("speed_mph", *v));
                if let Some(g) = accel {
                    s.merge(
                        SensorGroup::Inertial,
                        Reading::new().with("accel_long_g", g[i]),
                    );
                }
                s
            })
            .collect();
        SessionRecord::from_samples("runs", samples)
    }

    #[test]
    fn test_single_ramp_is_one_run() {
        // 0..=70 mph, 1 mph per sample, 0.1 s apart
        let speeds: Vec<_> = (0..=70).map(|v| Some(v as f64)).collect();
        let rec = record(&speeds, None, 0.1);
        let report = analyze_acceleration(&rec, &AnalysisConfig::default());

        assert!(report.found);
        assert_eq!(report.num_runs, 1);
        let best = report.best.unwrap();
        // last sample below 10 mph is index 9, first at/above 60 is index 60
        assert_eq!((best.start_idx, best.end_idx), (9, 60));
        let expected = rec.samples[60].elapsed_time.unwrap() - rec.samples[9].elapsed_time.unwrap();
        assert!((report.time.unwrap() - expected).abs() < 1e-12);
        assert!(report.avg_g.is_none());
    }

    #[test]
    fn test_never_below_low_is_not_found() {
        let speeds: Vec<_> = (15..=70).map(|v| Some(v as f64)).collect();
        let report = analyze_acceleration(&record(&speeds, None, 0.1), &AnalysisConfig::default());
        assert!(!report.found);
        assert!(report.all_times.is_empty());
        assert_eq!(report.num_runs, 0);
        assert!(report.time.is_none());
    }

    #[test]
    fn test_missing_speed_column() {
        let rec = SessionRecord::new("empty", vec!["elapsed_time".to_string()]);
        assert!(!analyze_braking(&rec, &AnalysisConfig::default()).found);
    }

    #[test]
    fn test_best_of_several_runs_and_g_window() {
        let speeds = [5.0, 30.0, 61.0, 3.0, 62.0, 0.0, 65.0]
            .map(Some)
            .to_vec();
        let accel = [0.2, 0.4, 0.1, 0.3, 0.9, 0.5, 0.0];
        let report = analyze_acceleration(
            &record(&speeds, Some(&accel), 1.0),
            &AnalysisConfig::default(),
        );
        assert_eq!(report.all_times, vec![2.0, 1.0, 1.0]);
        assert_eq!(report.time, Some(1.0));
        // first minimum wins: indices 3..4, window [3, 4)
        assert_eq!(report.best.map(|r| r.start_idx), Some(3));
        assert_eq!(report.avg_g, Some(0.3));
        assert_eq!(report.max_g, Some(0.3));
    }

    #[test]
    fn test_standing_start_times_from_last_stationary_sample() {
        // parked for 5 s, then 12 mph per second up to 60
        let speeds = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 12.0, 24.0, 36.0, 48.0, 60.0]
            .map(Some)
            .to_vec();
        let elapsed: Vec<_> = (0..speeds.len()).map(|i| Some(i as f64)).collect();
        let runs = detect_runs(&speeds, &elapsed, RunKind::Acceleration, 10.0, 60.0);

        assert_eq!(runs.len(), 1);
        // the start follows the vehicle while it is parked; time spent
        // stationary is not part of the run
        assert_eq!((runs[0].start_idx, runs[0].end_idx), (5, 10));
        assert_eq!(runs[0].duration, 5.0);
        assert_ne!(runs[0].duration, 10.0);
    }

    #[test]
    fn test_missing_speed_samples_are_skipped() {
        let speeds = vec![Some(0.0), None, Some(30.0), None, Some(60.0)];
        let runs = detect_runs(
            &speeds,
            &[Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            RunKind::Acceleration,
            10.0,
            60.0,
        );
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].duration, 4.0);
    }

    #[test]
    fn test_braking_distance() {
        let speeds = [70.0, 61.0, 40.0, 20.0, 4.0].map(Some).to_vec();
        let accel = [0.0, -1.0, -1.0, -1.0, 0.0];
        let report = analyze_braking(
            &record(&speeds, Some(&accel), 1.0),
            &AnalysisConfig::default(),
        );
        assert!(report.found);
        assert_eq!(report.time, Some(3.0));
        assert_eq!(report.avg_g, Some(1.0));
        assert_eq!(report.max_g, Some(1.0));

        let v = 60.0 * MPH_TO_MPS;
        let expected = v * v / (2.0 * GRAVITY);
        assert!((report.distance_m.unwrap() - expected).abs() < 1e-9);
        assert!((report.distance_ft.unwrap() - expected * M_TO_FT).abs() < 1e-9);
        assert!(braking_distance_m(60.0, 0.0).is_none());
    }
}
