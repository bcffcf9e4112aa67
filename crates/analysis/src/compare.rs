//! Side-by-side comparison of two recorded sessions

use std::collections::BTreeMap;

use contracts::{columns, SessionRecord};
use serde::{Deserialize, Serialize};

use crate::series;

/// Metrics whose peaks are compared
pub const COMPARED_METRICS: [&str; 5] = [
    columns::RPM,
    columns::SPEED_MPH,
    columns::ACCEL_LONG_G,
    columns::ACCEL_LAT_G,
    columns::ACCEL_TOTAL_G,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub max1: f64,
    pub max2: f64,
    /// max2 - max1
    pub diff: f64,
}

/// Differences are always second minus first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionComparison {
    pub session1: String,
    pub session2: String,
    pub duration_diff: f64,
    pub samples_diff: i64,
    pub metrics: BTreeMap<String, MetricComparison>,
}

pub fn compare_sessions(first: &SessionRecord, second: &SessionRecord) -> SessionComparison {
    let metrics = COMPARED_METRICS
        .iter()
        .filter_map(|&metric| {
            let max1 = series::max(&series::column(first, metric))?;
            let max2 = series::max(&series::column(second, metric))?;
            Some((
                metric.to_string(),
                MetricComparison {
                    max1,
                    max2,
                    diff: max2 - max1,
                },
            ))
        })
        .collect();

    SessionComparison {
        session1: first.session_id.clone(),
        session2: second.session_id.clone(),
        duration_diff: second.duration_seconds().unwrap_or(0.0)
            - first.duration_seconds().unwrap_or(0.0),
        samples_diff: second.len() as i64 - first.len() as i64,
        metrics,
    }
}

impl std::fmt::Display for SessionComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== {} vs {} ===", self.session1, self.session2)?;
        writeln!(f, "Duration diff: {:+.2} s", self.duration_diff)?;
        writeln!(f, "Samples diff: {:+}", self.samples_diff)?;
        for (metric, m) in &self.metrics {
            writeln!(
                f,
                "{metric}: {:.2} -> {:.2} ({:+.2})",
                m.max1, m.max2, m.diff
            )?;
        }
        Ok(())
    }
}
