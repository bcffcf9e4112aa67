//! Start/finish geofence lap detection

use contracts::{columns, AnalysisConfig, Coordinate, SessionRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geo::haversine;
use crate::series;

/// One lap between two consecutive geofence entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub lap_number: usize,
    pub start_idx: usize,
    pub end_idx: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_mph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed_mph: Option<f64>,
    /// Peak total g
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_g: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LapSummary {
    pub num_laps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_lap_time: Option<f64>,
    pub laps: Vec<Lap>,
}

/// Distance of every sample from the start point; infinite without a fix
pub fn distance_from(record: &SessionRecord, start: Coordinate) -> Vec<f64> {
    record
        .samples
        .iter()
        .map(|s| match s.fix() {
            Some((lat, lon)) => haversine(start.lat, start.lon, lat, lon),
            None => f64::INFINITY,
        })
        .collect()
}

/// Indices where the vehicle enters the geofence
pub fn crossings(distance: &[f64], threshold_m: f64) -> Vec<usize> {
    distance
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1] < threshold_m && w[0] >= threshold_m)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Detect laps around the configured (or first valid) start point
pub fn detect_laps(record: &SessionRecord, config: &AnalysisConfig) -> Vec<Lap> {
    if !record.has_column(columns::GPS_LAT) || !record.has_column(columns::GPS_LON) {
        debug!("No position columns, skipping lap detection");
        return Vec::new();
    }

    let start = match config.start_finish {
        Some(point) => point,
        None => match record.samples.iter().find_map(|s| s.fix()) {
            Some((lat, lon)) => Coordinate { lat, lon },
            None => {
                warn!("No valid GPS fix, cannot place start line");
                return Vec::new();
            }
        },
    };
    debug!(lat = start.lat, lon = start.lon, "Start line placed");

    let distance = distance_from(record, start);
    let entries = crossings(&distance, config.lap_threshold_m);
    if entries.len() < 2 {
        warn!(crossings = entries.len(), "Not enough start line crossings for a lap");
        return Vec::new();
    }

    let elapsed = series::column(record, columns::ELAPSED_TIME);
    let speed = series::column(record, columns::SPEED_MPH);
    let total_g = series::column(record, columns::ACCEL_TOTAL_G);

    entries
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (start_idx, end_idx) = (pair[0], pair[1]);
            let (start_time, end_time) = (elapsed[start_idx], elapsed[end_idx]);
            let lap_time = start_time.zip(end_time).map(|(t0, t1)| t1 - t0);
            let window = start_idx..end_idx;
            let lap = Lap {
                lap_number: i + 1,
                start_idx,
                end_idx,
                start_time,
                end_time,
                lap_time,
                max_speed_mph: series::max(&speed[window.clone()]),
                avg_speed_mph: series::mean(&speed[window.clone()]),
                max_g: series::max(&total_g[window]),
            };
            info!(lap = lap.lap_number, time_s = ?lap.lap_time, "Lap detected");
            lap
        })
        .collect()
}

pub fn summarize_laps(record: &SessionRecord, config: &AnalysisConfig) -> LapSummary {
    let laps = detect_laps(record, config);
    LapSummary {
        num_laps: laps.len(),
        best_lap_time: laps
            .iter()
            .filter_map(|l| l.lap_time)
            .reduce(f64::min),
        laps,
    }
}
