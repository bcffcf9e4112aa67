//! Unit conversion constants

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.80665;

/// mph -> m/s
pub const MPH_TO_MPS: f64 = 0.44704;

/// m -> ft
pub const M_TO_FT: f64 = 3.28084;

/// W -> mechanical hp
pub const WATTS_PER_HP: f64 = 745.7;

/// hp·5252/rpm = lb·ft
pub const TORQUE_CONSTANT: f64 = 5252.0;

/// 1/4 mile (m)
pub const QUARTER_MILE_M: f64 = 402.336;
