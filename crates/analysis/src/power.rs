//! Wheel power / torque estimate from longitudinal acceleration
//!
//! P = m · a · v with a = accel_long_g · g, torque = hp · 5252 / rpm.
//! First-order only: drivetrain losses, aero and rolling resistance, and
//! road grade are all ignored, so values read low at speed.

use contracts::{columns, PowerConfig, SessionRecord, VehicleConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::series;
use crate::units::{GRAVITY, MPH_TO_MPS, TORQUE_CONSTANT, WATTS_PER_HP};

/// Estimated horsepower for one sample
pub fn estimate_hp(mass_kg: f64, accel_g: f64, speed_mph: f64) -> f64 {
    let force_n = mass_kg * accel_g * GRAVITY;
    force_n * speed_mph * MPH_TO_MPS / WATTS_PER_HP
}

/// Torque (lb-ft) from horsepower at an engine speed
pub fn estimate_torque(hp: f64, rpm: f64) -> f64 {
    hp * TORQUE_CONSTANT / rpm
}

/// Mean values of one rpm bin `(rpm_low, rpm_high]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerBin {
    pub rpm_low: f64,
    pub rpm_high: f64,
    pub rpm: f64,
    pub hp: f64,
    pub torque_lbft: f64,
    pub samples: usize,
}

/// Peak value and the bin where it occurs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPeak {
    pub value: f64,
    pub rpm_low: f64,
    pub rpm_high: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerCurve {
    pub found: bool,
    pub bins: Vec<PowerBin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_hp: Option<PowerPeak>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_torque: Option<PowerPeak>,
}

#[derive(Default, Clone, Copy)]
struct BinAccumulator {
    rpm: f64,
    hp: f64,
    torque: f64,
    n: usize,
}

/// Right-inclusive bin index: `(min + k·w, min + (k+1)·w]`
fn bin_index(rpm: f64, config: &PowerConfig, bins: usize) -> Option<usize> {
    if rpm <= config.min_rpm || rpm > config.max_rpm {
        return None;
    }
    let k = ((rpm - config.min_rpm) / config.bin_width_rpm).ceil() as usize;
    k.checked_sub(1).filter(|k| *k < bins)
}

pub fn estimate_power_curve(
    record: &SessionRecord,
    vehicle: &VehicleConfig,
    config: &PowerConfig,
) -> PowerCurve {
    if !record.has_column(columns::RPM) || !record.has_column(columns::ACCEL_LONG_G) {
        debug!("No rpm/acceleration columns, skipping power estimate");
        return PowerCurve::default();
    }
    if config.bin_width_rpm <= 0.0 || config.max_rpm <= config.min_rpm {
        warn!(
            bin_width = config.bin_width_rpm,
            min_rpm = config.min_rpm,
            max_rpm = config.max_rpm,
            "Degenerate power bins"
        );
        return PowerCurve::default();
    }

    let bin_count = ((config.max_rpm - config.min_rpm) / config.bin_width_rpm).ceil() as usize;
    let mut acc = vec![BinAccumulator::default(); bin_count];

    let rpm = series::column(record, columns::RPM);
    let accel = series::column(record, columns::ACCEL_LONG_G);
    let speed = series::column(record, columns::SPEED_MPH);

    for i in 0..record.len() {
        let (Some(r), Some(g), Some(v)) = (rpm[i], accel[i], speed[i]) else {
            continue;
        };
        if g <= config.min_accel_g || r <= config.min_rpm {
            continue;
        }
        let Some(k) = bin_index(r, config, bin_count) else {
            continue;
        };
        let hp = estimate_hp(vehicle.mass_kg, g, v);
        let bin = &mut acc[k];
        bin.rpm += r;
        bin.hp += hp;
        bin.torque += estimate_torque(hp, r);
        bin.n += 1;
    }

    let bins: Vec<PowerBin> = acc
        .iter()
        .enumerate()
        .filter(|(_, b)| b.n > 0)
        .map(|(k, b)| {
            let n = b.n as f64;
            let rpm_low = config.min_rpm + k as f64 * config.bin_width_rpm;
            PowerBin {
                rpm_low,
                rpm_high: rpm_low + config.bin_width_rpm,
                rpm: b.rpm / n,
                hp: b.hp / n,
                torque_lbft: b.torque / n,
                samples: b.n,
            }
        })
        .collect();

    if bins.is_empty() {
        debug!("No samples under load, power curve empty");
        return PowerCurve::default();
    }

    let peak = |value: fn(&PowerBin) -> f64| {
        bins.iter()
            .copied()
            .reduce(|best, b| if value(&b) > value(&best) { b } else { best })
            .map(|b| PowerPeak {
                value: value(&b),
                rpm_low: b.rpm_low,
                rpm_high: b.rpm_high,
            })
    };
    let peak_hp = peak(|b| b.hp);
    let peak_torque = peak(|b| b.torque_lbft);

    PowerCurve {
        found: true,
        bins,
        peak_hp,
        peak_torque,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Reading, SensorGroup, SensorSample};

    fn sample(rpm: f64, g: f64, mph: Option<f64>) -> SensorSample {
        let mut s = SensorSample::default();
        s.merge(
            SensorGroup::VehicleBus,
            Reading::new().with("rpm", rpm).with("speed_mph", mph),
        );
        s.merge(SensorGroup::Inertial, Reading::new().with("accel_long_g", g));
        s
    }

    #[test]
    fn test_closed_form() {
        let hp = estimate_hp(1549.0, 0.3, 60.0);
        let expected = 1549.0 * 0.3 * 9.80665 * (60.0 * 0.44704) / 745.7;
        assert!((hp - expected).abs() < 1e-9);
        assert!((hp - 163.9).abs() < 0.1);

        let torque = estimate_torque(hp, 4000.0);
        assert!((torque - expected * 5252.0 / 4000.0).abs() < 1e-9);
        assert!((torque - 215.2).abs() < 0.1);
    }

    #[test]
    fn test_bins_are_right_inclusive() {
        let config = PowerConfig::default();
        assert_eq!(bin_index(1000.0, &config, 14), None);
        assert_eq!(bin_index(1000.5, &config, 14), Some(0));
        assert_eq!(bin_index(1500.0, &config, 14), Some(0));
        assert_eq!(bin_index(1500.5, &config, 14), Some(1));
        assert_eq!(bin_index(8000.0, &config, 14), Some(13));
        assert_eq!(bin_index(8000.5, &config, 14), None);
    }

    #[test]
    fn test_curve_filters_and_peaks() {
        let record = SessionRecord::from_samples(
            "power",
            vec![
                sample(4000.0, 0.3, Some(60.0)),
                sample(3800.0, 0.3, Some(60.0)),
                sample(6000.0, 0.4, Some(90.0)),
                // coasting, idle and missing speed are excluded
                sample(5000.0, 0.05, Some(70.0)),
                sample(900.0, 0.5, Some(5.0)),
                sample(4500.0, 0.5, None),
            ],
        );
        let curve =
            estimate_power_curve(&record, &VehicleConfig::default(), &PowerConfig::default());

        assert!(curve.found);
        assert_eq!(curve.bins.len(), 2);
        let first = curve.bins[0];
        assert_eq!((first.rpm_low, first.rpm_high), (3500.0, 4000.0));
        assert_eq!(first.samples, 2);
        assert!((first.rpm - 3900.0).abs() < 1e-9);

        let peak_hp = curve.peak_hp.unwrap();
        assert_eq!(peak_hp.rpm_low, 5500.0);
        assert!((peak_hp.value - estimate_hp(1549.0, 0.4, 90.0)).abs() < 1e-9);
        assert!(curve.peak_torque.is_some());
    }

    #[test]
    fn test_no_load_means_not_found() {
        let record = SessionRecord::from_samples("idle", vec![sample(800.0, 0.0, Some(0.0))]);
        let curve =
            estimate_power_curve(&record, &VehicleConfig::default(), &PowerConfig::default());
        assert!(!curve.found);
        assert!(curve.bins.is_empty());
    }
}
