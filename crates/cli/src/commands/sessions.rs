//! `sessions` command implementation.

use std::io::{self, BufRead, Write};

use analysis::compare_sessions;
use anyhow::{Context, Result};
use recorder::{SessionCatalog, SessionInfo};
use serde::Serialize;
use tracing::info;

use crate::cli::{SessionsArgs, SessionsCommand};
use crate::commands::{data_dir, load_blueprint};

/// Session row for JSON output
#[derive(Serialize)]
struct SessionEntry {
    name: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<u64>,
    finalized: bool,
    has_data: bool,
    size_bytes: u64,
}

impl From<&SessionInfo> for SessionEntry {
    fn from(info: &SessionInfo) -> Self {
        Self {
            name: info.name.clone(),
            path: info.path.display().to_string(),
            started_at: info.started_at.map(|t| t.to_rfc3339()),
            duration_seconds: info.summary.as_ref().map(|s| s.duration_seconds),
            samples: info.summary.as_ref().map(|s| s.samples_collected),
            finalized: info.summary.is_some(),
            has_data: info.has_data,
            size_bytes: info.size_bytes,
        }
    }
}

/// Execute the `sessions` command
pub fn run_sessions(args: &SessionsArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref())?;
    let catalog = SessionCatalog::new(data_dir(&blueprint, args.data_dir.as_ref()));

    match &args.command {
        SessionsCommand::List { json } => list(&catalog, *json),
        SessionsCommand::Compare {
            first,
            second,
            json,
        } => compare(&catalog, first, second, *json),
        SessionsCommand::Delete { name, yes } => delete(&catalog, name, *yes),
    }
}

fn list(catalog: &SessionCatalog, json: bool) -> Result<()> {
    let sessions = catalog
        .list()
        .with_context(|| format!("Failed to list sessions in {}", catalog.root().display()))?;
    let entries: Vec<SessionEntry> = sessions.iter().map(SessionEntry::from).collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialize session list")?
        );
        return Ok(());
    }

    if entries.is_empty() {
        println!("No sessions in {}", catalog.root().display());
        return Ok(());
    }

    println!("Sessions in {} ({}):\n", catalog.root().display(), entries.len());
    for entry in &entries {
        let detail = match (entry.samples, entry.duration_seconds) {
            (Some(samples), Some(duration)) => format!("{samples} samples, {duration:.1}s"),
            _ => "not finalized".to_string(),
        };
        println!(
            "  {}  {}  {:.1} KiB{}",
            entry.name,
            detail,
            entry.size_bytes as f64 / 1024.0,
            if entry.has_data { "" } else { "  (no data)" }
        );
    }
    Ok(())
}

fn compare(catalog: &SessionCatalog, first: &str, second: &str, json: bool) -> Result<()> {
    let a = catalog
        .load(first)
        .with_context(|| format!("Failed to load session {first}"))?;
    let b = catalog
        .load(second)
        .with_context(|| format!("Failed to load session {second}"))?;

    let comparison = compare_sessions(&a, &b);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&comparison).context("Failed to serialize comparison")?
        );
    } else {
        print!("{comparison}");
    }
    Ok(())
}

fn delete(catalog: &SessionCatalog, name: &str, yes: bool) -> Result<()> {
    // resolve first so a typo fails before prompting
    let session = catalog.find(name).with_context(|| format!("Unknown session {name}"))?;

    if !yes && !confirm(&format!("Delete {}?", session.path.display()))? {
        println!("Aborted");
        return Ok(());
    }

    catalog
        .delete(name)
        .with_context(|| format!("Failed to delete session {name}"))?;
    info!(session = %name, "Session removed");
    println!("✓ Deleted {name}");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
