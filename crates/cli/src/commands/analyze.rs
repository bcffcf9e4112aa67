//! `analyze` command implementation.

use std::path::PathBuf;

use analysis::{generate_report, REPORT_FILE};
use anyhow::{Context, Result};
use recorder::{load_dir, SessionCatalog};
use tracing::info;

use crate::cli::AnalyzeArgs;
use crate::commands::{data_dir, load_blueprint};

/// Execute the `analyze` command
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref())?;
    let session = resolve_session(args, &blueprint)?;

    info!(session = %session.display(), "Analyzing session");
    let record = load_dir(&session)
        .with_context(|| format!("Failed to load session {}", session.display()))?;
    if record.is_empty() {
        anyhow::bail!("Session {} has no samples", session.display());
    }

    let report = generate_report(&record, &blueprint.analysis, &blueprint.vehicle);

    if args.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!("{report}");
    }

    if !args.no_save {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| session.join(REPORT_FILE));
        report
            .write_to(&output)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
        if !args.json {
            println!("Report saved to {}", output.display());
        }
    }
    Ok(())
}

fn resolve_session(args: &AnalyzeArgs, blueprint: &contracts::DaqBlueprint) -> Result<PathBuf> {
    if let Some(ref session) = args.session {
        return Ok(session.clone());
    }

    let root = data_dir(blueprint, args.data_dir.as_ref());
    let latest = SessionCatalog::new(&root)
        .latest()
        .with_context(|| format!("Failed to list sessions in {}", root.display()))?;
    match latest {
        Some(info) => Ok(info.path),
        None => anyhow::bail!("No sessions found in {}", root.display()),
    }
}
