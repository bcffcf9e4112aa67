//! Adapter common utility functions

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use contracts::{ContractError, SensorGroup};

/// Seeded generator for reproducible synthetic streams, OS entropy otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Uniform noise in `[lo, hi)`
#[inline]
pub fn uniform(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    rng.random_range(lo..hi)
}

/// Read attempted on a disconnected adapter
#[inline]
pub fn not_connected(group: SensorGroup) -> ContractError {
    ContractError::sensor_read(group, "adapter not connected")
}

#[inline]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// m/s -> mph
pub const MPS_TO_MPH: f64 = 2.23694;
