//! `record` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RecordArgs;
use crate::commands::{data_dir, load_blueprint};
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `record` command
pub async fn run_record(args: &RecordArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    // Apply CLI overrides
    blueprint.storage.data_dir = data_dir(&blueprint, args.data_dir.as_ref());
    if let Some(rate) = args.rate_hz {
        info!(rate_hz = rate, "Overriding acquisition rate from CLI");
        blueprint.acquisition.target_rate_hz = rate;
    }
    if args.max_samples > 0 {
        blueprint.acquisition.max_samples = Some(args.max_samples);
    }
    if args.duration > 0 {
        blueprint.acquisition.max_duration_sec = Some(args.duration as f64);
    }
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Invalid configuration after CLI overrides")?;

    info!(
        vehicle = %blueprint.vehicle.name,
        source_mode = %blueprint.acquisition.source_mode,
        rate_hz = blueprint.acquisition.target_rate_hz,
        data_dir = %blueprint.storage.data_dir.display(),
        max_samples = ?blueprint.acquisition.max_samples,
        max_duration_sec = ?blueprint.acquisition.max_duration_sec,
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        seed: args.seed,
        live: args.live,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    let stats = pipeline.run().await.context("Recording failed")?;
    stats.print_summary();

    if stats.report.stop_reason.is_failure() {
        anyhow::bail!(
            "Session {} ended on a storage failure",
            stats.report.summary.session_id
        );
    }

    info!(session = %stats.report.summary.session_id, "Trackday recording finished");
    Ok(())
}
