//! SensorSample / SessionRecord - Scheduler output, Analysis input
//!
//! One merged row per tick. Every field is independently optional; a missing
//! value is `None`, never zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SensorGroup;

/// Standard column names of the recorded stream
pub mod columns {
    pub const TIMESTAMP: &str = "timestamp";
    pub const ELAPSED_TIME: &str = "elapsed_time";

    pub const RPM: &str = "rpm";
    pub const SPEED_MPH: &str = "speed_mph";
    pub const THROTTLE_POS: &str = "throttle_pos";
    pub const COOLANT_TEMP_F: &str = "coolant_temp_f";
    pub const INTAKE_TEMP_F: &str = "intake_temp_f";
    pub const MAF_GPS: &str = "maf_gps";
    pub const ENGINE_LOAD: &str = "engine_load";
    pub const TIMING_ADVANCE: &str = "timing_advance";
    pub const FUEL_TRIM_SHORT: &str = "fuel_trim_short";
    pub const FUEL_TRIM_LONG: &str = "fuel_trim_long";

    pub const ACCEL_LONG_G: &str = "accel_long_g";
    pub const ACCEL_LAT_G: &str = "accel_lat_g";
    pub const ACCEL_VERT_G: &str = "accel_vert_g";
    pub const ACCEL_TOTAL_G: &str = "accel_total_g";
    pub const PITCH_DEG: &str = "pitch_deg";
    pub const ROLL_DEG: &str = "roll_deg";
    pub const YAW_RATE_DPS: &str = "yaw_rate_dps";

    pub const GPS_LAT: &str = "gps_lat";
    pub const GPS_LON: &str = "gps_lon";
    pub const GPS_ALT_M: &str = "gps_alt_m";
    pub const GPS_SPEED_MPH: &str = "gps_speed_mph";
    pub const GPS_HEADING: &str = "gps_heading";
    pub const GPS_SATELLITES: &str = "gps_satellites";
    pub const GPS_VALID: &str = "gps_valid";

    pub const TEMP_OIL_F: &str = "temp_oil_f";
    pub const TEMP_INTAKE_F: &str = "temp_intake_f";
    pub const TEMP_BRAKE_F: &str = "temp_brake_f";
    pub const TEMP_TRANS_F: &str = "temp_trans_f";
    pub const TEMP_AMBIENT_F: &str = "temp_ambient_f";

    /// Prefix shared by all temperature-probe columns
    pub const TEMP_PREFIX: &str = "temp_";

    pub const ENGINE_FIELDS: [&str; 10] = [
        RPM,
        SPEED_MPH,
        THROTTLE_POS,
        COOLANT_TEMP_F,
        INTAKE_TEMP_F,
        MAF_GPS,
        ENGINE_LOAD,
        TIMING_ADVANCE,
        FUEL_TRIM_SHORT,
        FUEL_TRIM_LONG,
    ];

    pub const INERTIAL_FIELDS: [&str; 7] = [
        ACCEL_LONG_G,
        ACCEL_LAT_G,
        ACCEL_VERT_G,
        ACCEL_TOTAL_G,
        PITCH_DEG,
        ROLL_DEG,
        YAW_RATE_DPS,
    ];

    pub const POSITION_FIELDS: [&str; 7] = [
        GPS_LAT,
        GPS_LON,
        GPS_ALT_M,
        GPS_SPEED_MPH,
        GPS_HEADING,
        GPS_SATELLITES,
        GPS_VALID,
    ];

    pub const TEMPERATURE_FIELDS: [&str; 5] = [
        TEMP_OIL_F,
        TEMP_INTAKE_F,
        TEMP_BRAKE_F,
        TEMP_TRANS_F,
        TEMP_AMBIENT_F,
    ];
}

/// Fields owned by a sensor group, in column order
pub fn group_fields(group: SensorGroup) -> &'static [&'static str] {
    match group {
        SensorGroup::VehicleBus => &columns::ENGINE_FIELDS,
        SensorGroup::Inertial => &columns::INERTIAL_FIELDS,
        SensorGroup::Position => &columns::POSITION_FIELDS,
        SensorGroup::Temperature => &columns::TEMPERATURE_FIELDS,
    }
}

/// Group owning a standard column (None for timestamp/elapsed_time/unknown)
pub fn group_of(column: &str) -> Option<SensorGroup> {
    SensorGroup::ALL
        .into_iter()
        .find(|g| group_fields(*g).contains(&column))
}

/// Full header of the recorded stream, declared once per session
pub fn standard_columns() -> Vec<String> {
    let mut out = vec![
        columns::TIMESTAMP.to_string(),
        columns::ELAPSED_TIME.to_string(),
    ];
    for group in SensorGroup::ALL {
        out.extend(group_fields(group).iter().map(|c| c.to_string()));
    }
    out
}

/// Partial reading returned by one adapter
///
/// `name -> Option<f64>`; an empty reading means "no data this tick".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(BTreeMap<String, Option<f64>>);

impl Reading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Option<f64>>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of a field; absent and null are both `None`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge another reading in; later values win
    pub fn extend(&mut self, other: Reading) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, Option<f64>)> for Reading {
    fn from_iter<T: IntoIterator<Item = (String, Option<f64>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One merged row of the recorded stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Wall-clock time of the tick
    pub timestamp: Option<DateTime<Utc>>,

    /// Seconds since session start (monotonic, non-decreasing)
    pub elapsed_time: Option<f64>,

    /// Vehicle-bus group
    #[serde(default)]
    pub engine: Reading,

    /// Inertial group
    #[serde(default)]
    pub inertial: Reading,

    /// Position group
    #[serde(default)]
    pub position: Reading,

    /// Temperature group
    #[serde(default)]
    pub temperature: Reading,
}

impl SensorSample {
    /// Create an empty sample for one tick
    pub fn new(timestamp: Option<DateTime<Utc>>, elapsed_time: Option<f64>) -> Self {
        Self {
            timestamp,
            elapsed_time,
            ..Default::default()
        }
    }

    pub fn group(&self, group: SensorGroup) -> &Reading {
        match group {
            SensorGroup::VehicleBus => &self.engine,
            SensorGroup::Inertial => &self.inertial,
            SensorGroup::Position => &self.position,
            SensorGroup::Temperature => &self.temperature,
        }
    }

    pub fn group_mut(&mut self, group: SensorGroup) -> &mut Reading {
        match group {
            SensorGroup::VehicleBus => &mut self.engine,
            SensorGroup::Inertial => &mut self.inertial,
            SensorGroup::Position => &mut self.position,
            SensorGroup::Temperature => &mut self.temperature,
        }
    }

    /// Merge an adapter reading into its group
    pub fn merge(&mut self, group: SensorGroup, reading: Reading) {
        self.group_mut(group).extend(reading);
    }

    /// Look up any column by name
    ///
    /// Standard columns are resolved through their owning group; unknown
    /// columns are searched in every group.
    pub fn get(&self, column: &str) -> Option<f64> {
        if column == columns::ELAPSED_TIME {
            return self.elapsed_time;
        }
        match group_of(column) {
            Some(group) => self.group(group).get(column),
            None => SensorGroup::ALL
                .into_iter()
                .find_map(|g| self.group(g).get(column)),
        }
    }

    /// Position is usable for geofencing
    ///
    /// Latitude and longitude present, and the fix flag present and non-zero.
    /// Coordinates without a fix-quality flag are not trusted.
    pub fn has_valid_fix(&self) -> bool {
        let coords = self.position.get(columns::GPS_LAT).is_some()
            && self.position.get(columns::GPS_LON).is_some();
        let flag = self.position.get(columns::GPS_VALID).is_some_and(|v| v != 0.0);
        coords && flag
    }

    /// (lat, lon) when the fix is valid
    pub fn fix(&self) -> Option<(f64, f64)> {
        if !self.has_valid_fix() {
            return None;
        }
        Some((
            self.position.get(columns::GPS_LAT)?,
            self.position.get(columns::GPS_LON)?,
        ))
    }
}

/// Ordered, append-only sequence of samples for one session
///
/// Immutable once loaded for analysis; all derived series live in separate
/// buffers owned by the analysis routines.
#[derive(Debug, Clone, Default)]
pub struct SessionRecord {
    /// Session identifier (directory name, derived from creation time)
    pub session_id: String,

    /// Declared header
    pub columns: Vec<String>,

    /// Ordered samples
    pub samples: Vec<SensorSample>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            session_id: session_id.into(),
            columns,
            samples: Vec::new(),
        }
    }

    /// Record over in-memory samples with the standard header
    pub fn from_samples(session_id: impl Into<String>, samples: Vec<SensorSample>) -> Self {
        Self {
            session_id: session_id.into(),
            columns: standard_columns(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Column declared in the header
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Column projected into a separate owned series
    pub fn column(&self, column: &str) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.get(column)).collect()
    }

    /// Largest elapsed time in the record
    pub fn duration_seconds(&self) -> Option<f64> {
        self.samples
            .iter()
            .filter_map(|s| s.elapsed_time)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_columns_layout() {
        let cols = standard_columns();
        assert_eq!(cols.len(), 31);
        assert_eq!(cols[0], "timestamp");
        assert_eq!(cols[1], "elapsed_time");
        assert_eq!(cols[2], "rpm");
        assert_eq!(cols.last().map(String::as_str), Some("temp_ambient_f"));
    }

    #[test]
    fn test_group_of() {
        assert_eq!(group_of("rpm"), Some(SensorGroup::VehicleBus));
        assert_eq!(group_of("gps_valid"), Some(SensorGroup::Position));
        assert_eq!(group_of("temp_oil_f"), Some(SensorGroup::Temperature));
        assert_eq!(group_of("elapsed_time"), None);
    }

    #[test]
    fn test_sample_get_and_merge() {
        let mut sample = SensorSample::new(None, Some(1.5));
        sample.merge(
            SensorGroup::VehicleBus,
            Reading::new().with("rpm", 3000.0).with("speed_mph", None::<f64>),
        );
        sample.merge(SensorGroup::Inertial, Reading::new().with("custom", 2.0));

        assert_eq!(sample.get("rpm"), Some(3000.0));
        assert_eq!(sample.get("speed_mph"), None);
        assert_eq!(sample.get("elapsed_time"), Some(1.5));
        assert_eq!(sample.get("custom"), Some(2.0));
    }

    #[test]
    fn test_zero_is_a_value() {
        let reading = Reading::new().with("speed_mph", 0.0);
        assert_eq!(reading.get("speed_mph"), Some(0.0));
    }

    #[test]
    fn test_valid_fix() {
        let mut sample = SensorSample::default();
        assert!(!sample.has_valid_fix());

        sample.position = Reading::new().with("gps_lat", 37.0).with("gps_lon", -122.0);
        assert!(!sample.has_valid_fix(), "coordinates without a fix flag");
        assert_eq!(sample.fix(), None);

        sample.position.set("gps_valid", 0.0);
        assert!(!sample.has_valid_fix());
        assert_eq!(sample.fix(), None);

        sample.position.set("gps_valid", 1.0);
        assert_eq!(sample.fix(), Some((37.0, -122.0)));
    }

    #[test]
    fn test_record_duration() {
        let samples = (0..5)
            .map(|i| SensorSample::new(None, Some(i as f64 * 0.5)))
            .collect();
        let record = SessionRecord::from_samples("s", samples);
        assert_eq!(record.duration_seconds(), Some(2.0));
        assert!(record.has_column("gps_lat"));
        assert!(SessionRecord::default().duration_seconds().is_none());
    }
}
