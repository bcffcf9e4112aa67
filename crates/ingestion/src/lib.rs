//! # Ingestion
//!
//! Sensor adapter module.
//!
//! Responsibilities:
//! - Build one adapter per sensor group from the blueprint (synthetic or physical)
//! - Synthetic data sources for every group
//! - Inertial calibration (offsets, mounting rotation, complementary filter, zero-point)
//! - Temperature threshold levels
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::AdapterRegistry;
//!
//! let mut registry = AdapterRegistry::from_blueprint(&blueprint, None);
//! // Physical drivers replace the placeholder for their group
//! registry.register(Box::new(my_can_bus_driver));
//! let adapters = registry.into_adapters();
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::ScriptedAdapter;
//!
//! let adapter = ScriptedAdapter::new(SensorGroup::Inertial).failing();
//! ```

mod adapters;
mod calibration;
mod error;
mod mock;
mod registry;

// Re-exports
pub use adapters::{
    fix_is_valid, probe_level, DrivePhase, ProbeLevel, SyntheticInertial, SyntheticPosition,
    SyntheticTemperature, SyntheticVehicleBus, UnavailableAdapter,
};
pub use calibration::{
    ComplementaryFilter, GForces, InertialFrame, ZeroPointCalibration, GRAVITY,
    MIN_CALIBRATION_SAMPLES, NOISE_WARN_THRESHOLD,
};
pub use error::{IngestionError, Result};
pub use mock::{FailurePlan, ScriptedAdapter};
pub use registry::AdapterRegistry;
