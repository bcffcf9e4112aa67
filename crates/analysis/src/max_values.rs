//! Session-wide peaks

use std::collections::BTreeMap;

use contracts::{columns, SessionRecord};
use serde::{Deserialize, Serialize};

use crate::series;

/// Peak of every metric the record carries
///
/// Temperature peaks are flattened as `<column>_max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaxValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_mph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_accel_g: Option<f64>,
    /// |min longitudinal g|
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_braking_g: Option<f64>,
    /// max |lateral g|
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lateral_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_g: Option<f64>,
    #[serde(flatten)]
    pub temperatures: BTreeMap<String, f64>,
}

fn peak(record: &SessionRecord, column: &str) -> Option<f64> {
    series::max(&series::column(record, column))
}

pub fn max_values(record: &SessionRecord) -> MaxValues {
    let long = series::column(record, columns::ACCEL_LONG_G);
    let lateral: Vec<Option<f64>> = series::column(record, columns::ACCEL_LAT_G)
        .into_iter()
        .map(|v| v.map(f64::abs))
        .collect();

    let temperatures = record
        .columns
        .iter()
        .filter(|c| c.starts_with(columns::TEMP_PREFIX))
        .filter_map(|c| peak(record, c).map(|v| (format!("{c}_max"), v)))
        .collect();

    MaxValues {
        max_speed_mph: peak(record, columns::SPEED_MPH),
        max_rpm: peak(record, columns::RPM),
        max_accel_g: series::max(&long),
        max_braking_g: series::min(&long).map(f64::abs),
        max_lateral_g: series::max(&lateral),
        max_total_g: peak(record, columns::ACCEL_TOTAL_G),
        temperatures,
    }
}
