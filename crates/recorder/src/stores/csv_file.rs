//! CsvRecordStore - header-declared CSV rows on disk
//!
//! Missing values are written as empty cells, never as zero. Reading back is
//! tolerant: empty cells, unparseable cells and `True`/`False` flags are all
//! accepted.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use contracts::{
    columns, group_of, ContractError, RecordStore, SensorGroup, SensorSample, SessionRecord,
};
use tracing::{debug, instrument};

/// Append-only CSV store
pub struct CsvRecordStore {
    name: String,
    path: PathBuf,
    columns: Vec<String>,
    writer: Option<csv::Writer<File>>,
}

impl CsvRecordStore {
    /// Create the file and write the header
    ///
    /// Fails if the file already exists; a session file is never reused.
    #[instrument(name = "csv_store_create", skip(columns), fields(path = %path.display()))]
    pub fn create(path: &Path, columns: Vec<String>) -> Result<Self, ContractError> {
        let name = path.display().to_string();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| ContractError::store_create(&name, e.to_string()))?;

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(&columns)
            .map_err(|e| ContractError::store_create(&name, e.to_string()))?;
        writer
            .flush()
            .map_err(|e| ContractError::store_create(&name, e.to_string()))?;

        debug!(columns = columns.len(), "CSV header written");
        Ok(Self {
            name,
            path: path.to_path_buf(),
            columns,
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// One CSV row in header order
fn encode_row(columns: &[String], sample: &SensorSample) -> Vec<String> {
    columns
        .iter()
        .map(|col| match col.as_str() {
            columns::TIMESTAMP => sample
                .timestamp
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
                .unwrap_or_default(),
            _ => sample.get(col).map(|v| v.to_string()).unwrap_or_default(),
        })
        .collect()
}

impl RecordStore for CsvRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn append_batch(&mut self, samples: &[SensorSample]) -> Result<(), ContractError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ContractError::store_write(&self.name, "store closed"))?;

        for sample in samples {
            writer
                .write_record(encode_row(&self.columns, sample))
                .map_err(|e| ContractError::store_write(&self.name, e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| ContractError::store_write(&self.name, e.to_string()))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ContractError::store_write(&self.name, e.to_string()))?;
            debug!(path = %self.path.display(), "CSV store closed");
        }
        Ok(())
    }
}

/// Parse one numeric cell
///
/// Empty or unparseable cells are `None`; boolean flags map to 1/0.
pub fn parse_cell(raw: &str) -> Option<f64> {
    let cell = raw.trim();
    match cell {
        "" => None,
        "True" | "true" | "TRUE" => Some(1.0),
        "False" | "false" | "FALSE" => Some(0.0),
        _ => cell.parse::<f64>().ok().filter(|v| !v.is_nan()),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let cell = raw.trim();
    if cell.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(cell)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(cell, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}

/// Group for a column read from disk
///
/// Non-standard columns are routed by prefix so extra probes and custom
/// channels survive a round trip.
fn column_group(column: &str) -> SensorGroup {
    if let Some(group) = group_of(column) {
        return group;
    }
    if column.starts_with(columns::TEMP_PREFIX) {
        SensorGroup::Temperature
    } else if column.starts_with("gps_") {
        SensorGroup::Position
    } else if column.starts_with("accel_") || column.ends_with("_deg") || column.ends_with("_dps")
    {
        SensorGroup::Inertial
    } else {
        SensorGroup::VehicleBus
    }
}

/// Load a recorded stream into an immutable SessionRecord
#[instrument(name = "csv_store_load", skip(session_id), fields(path = %path.display()))]
pub fn read_record(path: &Path, session_id: &str) -> Result<SessionRecord, ContractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ContractError::record_parse(0, e.to_string()))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| ContractError::record_parse(0, e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let groups: Vec<SensorGroup> = header.iter().map(|h| column_group(h)).collect();

    let mut record = SessionRecord::new(session_id, header.clone());
    for (row, result) in reader.records().enumerate() {
        let fields = result.map_err(|e| ContractError::record_parse(row + 1, e.to_string()))?;
        let mut sample = SensorSample::default();

        for (idx, cell) in fields.iter().enumerate() {
            let Some(column) = header.get(idx) else {
                continue;
            };
            match column.as_str() {
                columns::TIMESTAMP => sample.timestamp = parse_timestamp(cell),
                columns::ELAPSED_TIME => sample.elapsed_time = parse_cell(cell),
                _ => {
                    if let Some(value) = parse_cell(cell) {
                        sample.group_mut(groups[idx]).set(column.as_str(), value);
                    }
                }
            }
        }
        record.samples.push(sample);
    }

    debug!(samples = record.len(), "Session record loaded");
    Ok(record)
}
