//! SessionWriter - one session directory, one recorded stream, one summary
//!
//! Layout:
//!
//! ```text
//! <data_dir>/session_YYYYMMDD_HHMMSS/
//!     data.csv
//!     session_summary.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use contracts::{
    RecordStore, SensorGroup, SensorSample, SessionSummary, SourceMode, StorageConfig,
    VehicleConfig,
};
use tracing::{error, info, instrument, warn};

use crate::buffer::{FlushOutcome, SampleBuffer};
use crate::error::RecorderError;
use crate::metrics::WriterMetrics;
use crate::stores::CsvRecordStore;

/// Recorded stream file name
pub const DATA_FILE: &str = "data.csv";

/// Summary document file name
pub const SUMMARY_FILE: &str = "session_summary.json";

/// Directory name prefix of every session
pub const SESSION_PREFIX: &str = "session_";

/// Upper bound on same-second collision suffixes
const MAX_NAME_ATTEMPTS: u32 = 100;

/// A freshly created, exclusively owned session directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    pub id: String,
    pub path: PathBuf,
}

impl SessionDir {
    /// Create `session_YYYYMMDD_HHMMSS` under `root`
    ///
    /// An existing directory is never reused; a same-second collision gets a
    /// numeric suffix.
    pub fn allocate(root: &Path, now: DateTime<Utc>) -> Result<Self, RecorderError> {
        fs::create_dir_all(root).map_err(|e| RecorderError::session_create(root, e.to_string()))?;

        let base = format!(
            "{}{}",
            SESSION_PREFIX,
            now.with_timezone(&Local).format("%Y%m%d_%H%M%S")
        );

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let id = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}_{attempt}")
            };
            let path = root.join(&id);
            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { id, path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(RecorderError::session_create(&path, e.to_string())),
            }
        }

        Err(RecorderError::session_create(
            root.join(&base),
            "no free session name",
        ))
    }

    pub fn data_path(&self) -> PathBuf {
        self.path.join(DATA_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.path.join(SUMMARY_FILE)
    }
}

/// Buffered writer for one acquisition session
pub struct SessionWriter<S: RecordStore = CsvRecordStore> {
    dir: SessionDir,
    buffer: SampleBuffer<S>,
    vehicle: VehicleConfig,
    source_mode: SourceMode,
    started_at: DateTime<Utc>,
}

impl SessionWriter<CsvRecordStore> {
    /// Allocate the session directory and open the CSV stream
    #[instrument(
        name = "session_writer_create",
        skip(storage, columns, vehicle),
        fields(data_dir = %storage.data_dir.display())
    )]
    pub fn create(
        storage: &StorageConfig,
        columns: Vec<String>,
        vehicle: VehicleConfig,
        source_mode: SourceMode,
    ) -> Result<Self, RecorderError> {
        let started_at = Utc::now();
        let dir = SessionDir::allocate(&storage.data_dir, started_at)?;
        let store = CsvRecordStore::create(&dir.data_path(), columns)
            .map_err(|e| RecorderError::session_create(dir.data_path(), e.to_string()))?;

        info!(session = %dir.id, path = %dir.path.display(), "Session created");
        Ok(Self::with_store(
            dir,
            store,
            storage,
            vehicle,
            source_mode,
            started_at,
        ))
    }
}

impl<S: RecordStore> SessionWriter<S> {
    /// Writer over an arbitrary store (already-allocated directory)
    pub fn with_store(
        dir: SessionDir,
        store: S,
        storage: &StorageConfig,
        vehicle: VehicleConfig,
        source_mode: SourceMode,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            dir,
            buffer: SampleBuffer::new(store, storage.batch_size, storage.max_pending_samples),
            vehicle,
            source_mode,
            started_at,
        }
    }

    pub fn append(&self, sample: SensorSample) -> Result<(), RecorderError> {
        self.buffer.append(sample)
    }

    pub fn flush(&self) -> Result<FlushOutcome, RecorderError> {
        self.buffer.flush()
    }

    pub fn session_id(&self) -> &str {
        &self.dir.id
    }

    pub fn path(&self) -> &Path {
        &self.dir.path
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn total_samples(&self) -> u64 {
        self.buffer.total_samples()
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.pending_len()
    }

    pub fn metrics(&self) -> Arc<WriterMetrics> {
        self.buffer.metrics()
    }

    /// Final flush, close the stream and persist the summary
    ///
    /// Consumes the writer, so the summary is written at most once.
    #[instrument(name = "session_writer_finish", skip(self, errors), fields(session = %self.dir.id))]
    pub fn finish(self, errors: BTreeMap<SensorGroup, u64>) -> Result<SessionSummary, RecorderError> {
        let samples_collected = match self.buffer.close() {
            Ok(report) => {
                if report.unflushed > 0 {
                    warn!(
                        unflushed = report.unflushed,
                        "Session finalized with unpersisted samples"
                    );
                }
                report.total_samples
            }
            Err(e) => {
                error!(error = %e, "Buffer close failed");
                self.buffer.metrics().snapshot().samples_appended
            }
        };

        let session_end = Utc::now();
        let duration_seconds =
            (session_end - self.started_at).num_microseconds().unwrap_or(0) as f64 / 1e6;

        let summary = SessionSummary {
            session_id: self.dir.id.clone(),
            session_start: self.started_at,
            session_end,
            duration_seconds,
            samples_collected,
            errors,
            vehicle: self.vehicle,
            source_mode: self.source_mode,
        };

        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| RecorderError::summary(e.to_string()))?;
        fs::write(self.dir.summary_path(), json)?;

        info!(
            samples = summary.samples_collected,
            duration_s = summary.duration_seconds,
            errors = summary.total_errors(),
            "Session summary written"
        );
        Ok(summary)
    }
}

/// Read a persisted summary document
pub fn read_summary(path: &Path) -> Result<SessionSummary, RecorderError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| RecorderError::summary(e.to_string()))
}
