//! Record store implementations

mod csv_file;

pub use csv_file::{parse_cell, read_record, CsvRecordStore};

use contracts::{columns, standard_columns, ProbeConfig};

/// Header for a new session
///
/// Standard columns first, then any configured probe column that is not
/// already part of the standard layout.
pub fn session_columns(probes: &[ProbeConfig]) -> Vec<String> {
    let mut out = standard_columns();
    for probe in probes {
        if probe.column.starts_with(columns::TEMP_PREFIX) && !out.contains(&probe.column) {
            out.push(probe.column.clone());
        }
    }
    out
}
