//! SensorGroup / SourceMode - adapter identity
//!
//! Each adapter owns exactly one field group of the merged sample.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor field group, one per adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorGroup {
    /// Engine / vehicle-bus parameters (rpm, speed, throttle, ...)
    VehicleBus,
    /// Accelerometer + gyroscope derived values
    Inertial,
    /// Satellite positioning
    Position,
    /// Discrete temperature probes
    Temperature,
}

impl SensorGroup {
    /// Fixed acquisition order
    pub const ALL: [SensorGroup; 4] = [
        SensorGroup::VehicleBus,
        SensorGroup::Inertial,
        SensorGroup::Position,
        SensorGroup::Temperature,
    ];

    /// Stable name used in logs, metrics labels and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorGroup::VehicleBus => "vehicle_bus",
            SensorGroup::Inertial => "inertial",
            SensorGroup::Position => "position",
            SensorGroup::Temperature => "temperature",
        }
    }
}

impl fmt::Display for SensorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data-source mode, decided once when an adapter is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Real hardware driver
    Physical,
    /// Self-contained data generator
    #[default]
    Synthetic,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Physical => f.write_str("physical"),
            SourceMode::Synthetic => f.write_str("synthetic"),
        }
    }
}
