//! Command implementations.

mod analyze;
mod record;
mod sessions;
mod validate;

pub use analyze::run_analyze;
pub use record::run_record;
pub use sessions::run_sessions;
pub use validate::run_validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contracts::DaqBlueprint;
use tracing::{debug, info};

/// Load the configuration, or defaults when no file is given
pub(crate) fn load_blueprint(path: Option<&Path>) -> Result<DaqBlueprint> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            debug!("No configuration file, using defaults");
            Ok(DaqBlueprint::default())
        }
    }
}

/// Session root: CLI override first, then configuration
pub(crate) fn data_dir(blueprint: &DaqBlueprint, data_dir: Option<&PathBuf>) -> PathBuf {
    data_dir
        .cloned()
        .unwrap_or_else(|| blueprint.storage.data_dir.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_blueprint(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_defaults_and_override() {
        let blueprint = load_blueprint(None).unwrap();
        assert_eq!(data_dir(&blueprint, None), blueprint.storage.data_dir);

        let custom = PathBuf::from("/tmp/sessions");
        assert_eq!(data_dir(&blueprint, Some(&custom)), custom);
    }
}
