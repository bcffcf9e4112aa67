//! Adapter implementations

mod common;
mod inertial;
mod position;
mod temperature;
mod unavailable;
mod vehicle_bus;

pub use inertial::{DrivePhase, SyntheticInertial};
pub use position::{fix_is_valid, SyntheticPosition};
pub use temperature::{probe_level, ProbeLevel, SyntheticTemperature};
pub use unavailable::UnavailableAdapter;
pub use vehicle_bus::SyntheticVehicleBus;
