//! Owned column projections and small reductions over them

use contracts::SessionRecord;

/// Column as an owned series; empty when the header lacks it
pub(crate) fn column(record: &SessionRecord, name: &str) -> Vec<Option<f64>> {
    if record.has_column(name) {
        record.column(name)
    } else {
        vec![None; record.len()]
    }
}

/// Present values, in order
pub(crate) fn present(series: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    series.iter().filter_map(|v| *v)
}

pub(crate) fn max(series: &[Option<f64>]) -> Option<f64> {
    present(series).reduce(f64::max)
}

pub(crate) fn min(series: &[Option<f64>]) -> Option<f64> {
    present(series).reduce(f64::min)
}

pub(crate) fn mean(series: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = present(series).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
