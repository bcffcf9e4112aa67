//! Pipeline orchestrator - wires one recording session together.
//!
//! The acquisition loop runs on its own OS thread; this task only waits for
//! it, forwards shutdown signals and optionally logs live snapshots.

use std::path::PathBuf;
use std::time::Instant;

use acquisition::{AcquisitionError, Scheduler, SchedulerHandle, SnapshotPublisher};
use anyhow::{Context, Result};
use contracts::{columns, DaqBlueprint, LiveSnapshot};
use ingestion::AdapterRegistry;
use recorder::{session_columns, SessionCatalog, SessionWriter};
use tracing::{error, info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Effective configuration (CLI overrides applied)
    pub blueprint: DaqBlueprint,

    /// Seed for synthetic sources
    pub seed: Option<u64>,

    /// Log live snapshots
    pub live: bool,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Record until a limit is reached or a shutdown signal arrives
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let registry = AdapterRegistry::from_blueprint(blueprint, self.config.seed);
        if registry.is_empty() {
            anyhow::bail!("All sensor groups are disabled, nothing to record");
        }

        let probes = &blueprint.sensors.temperature.probes;
        let writer = SessionWriter::create(
            &blueprint.storage,
            session_columns(probes),
            blueprint.vehicle.clone(),
            blueprint.acquisition.source_mode,
        )
        .context("Failed to create session")?;
        let session_id = writer.session_id().to_string();
        let session_path = writer.path().to_path_buf();

        let scheduler = Scheduler::new(
            &blueprint.acquisition,
            registry.into_adapters(),
            writer,
            probes,
        )?;
        let handle = SchedulerHandle::spawn(scheduler)?;
        let stop = handle.stop_signal();

        let publisher = self.config.live.then(|| {
            SnapshotPublisher::spawn(
                handle.subscribe(),
                blueprint.acquisition.live_push_rate_hz,
                log_snapshot,
            )
        });

        info!(session = %session_id, path = %session_path.display(), "Recording started");

        let mut join = tokio::task::spawn_blocking(move || handle.join());
        let joined = tokio::select! {
            result = &mut join => result,
            _ = shutdown_signal() => {
                warn!("Received shutdown signal, finalizing session...");
                stop.stop();
                join.await
            }
        };

        let live_pushed = match publisher {
            Some(task) => Some(task.await.context("Live snapshot task failed")?),
            None => None,
        };

        let report = match joined.context("Acquisition thread join failed")? {
            Ok(report) => report,
            Err(e @ AcquisitionError::SensorsUnavailable { .. }) => {
                // nothing was recorded; drop the header-only session
                let catalog = SessionCatalog::new(blueprint.storage.data_dir.clone());
                if let Err(cleanup) = catalog.delete(&session_id) {
                    warn!(session = %session_id, error = %cleanup, "Failed to remove empty session");
                }
                return Err(e).context("Required sensors unavailable");
            }
            Err(e) => return Err(e).context("Acquisition failed"),
        };

        Ok(PipelineStats {
            report,
            session_path,
            wall_time: start_time.elapsed(),
            live_pushed,
        })
    }
}

fn log_snapshot(snapshot: &LiveSnapshot) {
    let sample = &snapshot.sample;
    info!(
        samples = snapshot.samples_collected,
        rpm = ?sample.get(columns::RPM),
        speed_mph = ?sample.get(columns::SPEED_MPH),
        accel_long_g = ?sample.get(columns::ACCEL_LONG_G),
        gps_valid = sample.has_valid_fix(),
        connected = ?snapshot.connection_status,
        "Live"
    );
}

/// Resolve when Ctrl+C or SIGTERM arrives
///
/// A handler that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SourceMode;
    use tempfile::tempdir;

    fn config(root: PathBuf, max_samples: u64) -> PipelineConfig {
        let mut blueprint = DaqBlueprint::default();
        blueprint.storage.data_dir = root;
        blueprint.acquisition.target_rate_hz = 200.0;
        blueprint.acquisition.max_samples = Some(max_samples);
        PipelineConfig {
            blueprint,
            seed: Some(42),
            live: true,
            metrics_port: None,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_synthetic_session_to_limit() {
        let root = tempdir().unwrap();
        let stats = Pipeline::new(config(root.path().to_path_buf(), 50))
            .run()
            .await
            .unwrap();

        assert_eq!(stats.report.summary.samples_collected, 50);
        assert!(!stats.report.stop_reason.is_failure());
        assert!(stats.session_path.join(recorder::SUMMARY_FILE).exists());
        assert!(stats.live_pushed.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_required_physical_sensors_abort_and_clean_up() {
        let root = tempdir().unwrap();
        let mut cfg = config(root.path().to_path_buf(), 10);
        cfg.blueprint.acquisition.source_mode = SourceMode::Physical;
        cfg.blueprint.acquisition.require_all_sensors = true;

        let err = Pipeline::new(cfg).run().await.unwrap_err();
        assert!(err.to_string().contains("Required sensors unavailable"));
        let catalog = SessionCatalog::new(root.path());
        assert!(catalog.list().unwrap().is_empty());
    }
}
