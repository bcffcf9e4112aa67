//! SessionCatalog - enumerate, load and delete recorded sessions

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use contracts::{SessionRecord, SessionSummary};
use tracing::{debug, info, warn};

use crate::error::RecorderError;
use crate::session::{read_summary, DATA_FILE, SESSION_PREFIX, SUMMARY_FILE};
use crate::stores::read_record;

/// One session directory on disk
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub name: String,
    pub path: PathBuf,
    /// From the summary, or parsed from the directory name
    pub started_at: Option<DateTime<Utc>>,
    /// None for sessions that were never finalized
    pub summary: Option<SessionSummary>,
    pub has_data: bool,
    pub size_bytes: u64,
}

/// Session directories under one data root
#[derive(Debug, Clone)]
pub struct SessionCatalog {
    root: PathBuf,
}

fn started_from_name(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(SESSION_PREFIX)?.get(..15)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

impl SessionCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All sessions, newest first
    ///
    /// A missing root is an empty catalog.
    pub fn list(&self) -> Result<Vec<SessionInfo>, RecorderError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(SESSION_PREFIX) || !entry.file_type()?.is_dir() {
                continue;
            }
            sessions.push(self.describe(name, entry.path()));
        }

        sessions.sort_by(|a, b| b.name.cmp(&a.name));
        debug!(root = %self.root.display(), count = sessions.len(), "Sessions listed");
        Ok(sessions)
    }

    fn describe(&self, name: String, path: PathBuf) -> SessionInfo {
        let summary_path = path.join(SUMMARY_FILE);
        let summary = if summary_path.exists() {
            match read_summary(&summary_path) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(session = %name, error = %e, "Unreadable session summary");
                    None
                }
            }
        } else {
            None
        };

        let data = path.join(DATA_FILE);
        let size_bytes = fs::read_dir(&path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .filter(|m| m.is_file())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        SessionInfo {
            started_at: summary
                .as_ref()
                .map(|s| s.session_start)
                .or_else(|| started_from_name(&name)),
            has_data: data.is_file(),
            name,
            path,
            summary,
            size_bytes,
        }
    }

    /// Most recent session
    pub fn latest(&self) -> Result<Option<SessionInfo>, RecorderError> {
        Ok(self.list()?.into_iter().next())
    }

    /// Session by directory name
    pub fn find(&self, name: &str) -> Result<SessionInfo, RecorderError> {
        let path = self.root.join(name);
        if !name.starts_with(SESSION_PREFIX) || !path.is_dir() {
            return Err(RecorderError::SessionNotFound {
                name: name.to_string(),
            });
        }
        Ok(self.describe(name.to_string(), path))
    }

    /// Materialize a session's recorded stream
    pub fn load(&self, name: &str) -> Result<SessionRecord, RecorderError> {
        let info = self.find(name)?;
        load_dir(&info.path)
    }

    /// Remove a session directory
    ///
    /// Only `session_*` directories directly under the root are touched.
    pub fn delete(&self, name: &str) -> Result<(), RecorderError> {
        let info = self.find(name)?;
        if info.path.parent() != Some(self.root.as_path()) {
            return Err(RecorderError::SessionNotFound {
                name: name.to_string(),
            });
        }
        fs::remove_dir_all(&info.path)?;
        info!(session = %info.name, "Session deleted");
        Ok(())
    }
}

/// Load the recorded stream of a session directory
///
/// The session id is the directory name.
pub fn load_dir(path: &Path) -> Result<SessionRecord, RecorderError> {
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = path.join(DATA_FILE);
    if !data.is_file() {
        return Err(RecorderError::SessionNotFound {
            name: data.display().to_string(),
        });
    }
    Ok(read_record(&data, &id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionWriter;
    use contracts::{
        standard_columns, Reading, SensorGroup, SensorSample, SourceMode, StorageConfig,
        VehicleConfig,
    };
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn record_session(root: &Path, samples: usize) -> String {
        let storage = StorageConfig {
            data_dir: root.to_path_buf(),
            batch_size: 10,
            max_pending_samples: 100,
        };
        let writer = SessionWriter::create(
            &storage,
            standard_columns(),
            VehicleConfig::default(),
            SourceMode::Synthetic,
        )
        .unwrap();
        for i in 0..samples {
            let mut sample = SensorSample::new(Some(Utc::now()), Some(i as f64));
            sample.merge(SensorGroup::VehicleBus, Reading::new().with("rpm", 2000.0));
            writer.append(sample).unwrap();
        }
        let id = writer.session_id().to_string();
        writer.finish(BTreeMap::new()).unwrap();
        id
    }

    #[test]
    fn test_empty_or_missing_root() {
        let root = tempdir().unwrap();
        let catalog = SessionCatalog::new(root.path().join("missing"));
        assert!(catalog.list().unwrap().is_empty());
        assert!(catalog.latest().unwrap().is_none());
    }

    #[test]
    fn test_list_load_delete() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("session_20200101_000000")).unwrap();
        fs::create_dir(root.path().join("unrelated")).unwrap();
        let id = record_session(root.path(), 25);

        let catalog = SessionCatalog::new(root.path());
        let sessions = catalog.list().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].name, id);
        assert!(sessions[0].has_data);
        assert!(sessions[0].size_bytes > 0);
        assert_eq!(
            sessions[0].summary.as_ref().map(|s| s.samples_collected),
            Some(25)
        );

        // unfinished session: no summary, start time from the name
        assert!(sessions[1].summary.is_none());
        assert!(!sessions[1].has_data);
        assert!(sessions[1].started_at.is_some());

        assert_eq!(catalog.latest().unwrap().map(|s| s.name), Some(id.clone()));

        let record = catalog.load(&id).unwrap();
        assert_eq!(record.len(), 25);
        assert_eq!(record.session_id, id);

        catalog.delete(&id).unwrap();
        assert_eq!(catalog.list().unwrap().len(), 1);
        assert!(matches!(
            catalog.load(&id),
            Err(RecorderError::SessionNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_refuses_foreign_names() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("unrelated")).unwrap();
        let catalog = SessionCatalog::new(root.path());
        assert!(catalog.delete("unrelated").is_err());
        assert!(catalog.delete("session_../unrelated").is_err());
        assert!(root.path().join("unrelated").exists());
    }
}
