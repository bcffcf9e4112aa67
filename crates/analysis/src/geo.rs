//! Great-circle distance helpers

use contracts::SessionRecord;

/// Mean Earth radius (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // clamp guards asin against rounding just above 1
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Cumulative travelled distance per sample (m)
///
/// A segment contributes only when both ends carry a valid fix, so the
/// series is non-decreasing.
pub fn cumulative_distance(record: &SessionRecord) -> Vec<f64> {
    let mut out = Vec::with_capacity(record.len());
    let mut total = 0.0;
    let mut previous: Option<(f64, f64)> = None;

    for sample in &record.samples {
        let fix = sample.fix();
        if let (Some((lat1, lon1)), Some((lat2, lon2))) = (previous, fix) {
            total += haversine(lat1, lon1, lat2, lon2);
        }
        previous = fix;
        out.push(total);
    }
    out
}
