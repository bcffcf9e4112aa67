//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DaqBlueprint, SensorGroup, SourceMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    vehicle: String,
    source_mode: String,
    target_rate_hz: f64,
    data_dir: String,
    enabled_groups: Vec<String>,
    probe_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let (result, blueprint) = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if let (true, Some(blueprint)) = (args.print_config, blueprint) {
        let toml = config_loader::ConfigLoader::to_toml(&blueprint)
            .context("Failed to render configuration")?;
        println!("\n{toml}");
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn enabled_groups(blueprint: &DaqBlueprint) -> Vec<SensorGroup> {
    let sensors = &blueprint.sensors;
    SensorGroup::ALL
        .into_iter()
        .filter(|group| match group {
            SensorGroup::VehicleBus => sensors.vehicle_bus.enabled,
            SensorGroup::Inertial => sensors.inertial.enabled,
            SensorGroup::Position => sensors.position.enabled,
            SensorGroup::Temperature => sensors.temperature.enabled,
        })
        .collect()
}

fn validate_config(args: &ValidateArgs) -> (ValidationResult, Option<DaqBlueprint>) {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        let result = ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
        return (result, None);
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let result = ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    vehicle: blueprint.vehicle.name.clone(),
                    source_mode: blueprint.acquisition.source_mode.to_string(),
                    target_rate_hz: blueprint.acquisition.target_rate_hz,
                    data_dir: blueprint.storage.data_dir.display().to_string(),
                    enabled_groups: enabled_groups(&blueprint)
                        .iter()
                        .map(|g| g.to_string())
                        .collect(),
                    probe_count: blueprint.sensors.temperature.probes.len(),
                }),
            };
            (result, Some(blueprint))
        }
        Err(e) => {
            let result = ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            };
            (result, None)
        }
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &DaqBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let groups = enabled_groups(blueprint);

    if groups.is_empty() {
        warnings.push("All sensor groups are disabled - nothing to record".to_string());
    }

    if blueprint.acquisition.source_mode == SourceMode::Physical {
        warnings.push(
            "source_mode = physical but no hardware drivers are built in - groups will report disconnected"
                .to_string(),
        );
    }

    if groups.contains(&SensorGroup::Temperature) && blueprint.sensors.temperature.probes.is_empty() {
        warnings.push("Temperature group enabled without probes".to_string());
    }

    if blueprint.acquisition.target_rate_hz > 200.0 {
        warnings.push(format!(
            "target_rate_hz = {} - ticks will likely overrun",
            blueprint.acquisition.target_rate_hz
        ));
    }

    if groups.contains(&SensorGroup::Position) && blueprint.analysis.start_finish.is_none() {
        warnings.push(
            "analysis.start_finish not set - laps use the first valid fix as start line".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Vehicle: {}", summary.vehicle);
            println!("  Source: {}", summary.source_mode);
            println!("  Rate: {} Hz", summary.target_rate_hz);
            println!("  Data dir: {}", summary.data_dir);
            println!("  Sensor groups: {}", summary.enabled_groups.join(", "));
            println!("  Temperature probes: {}", summary.probe_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args(config: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config,
            json: true,
            print_config: false,
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let (result, blueprint) = validate_config(&args(dir.path().join("missing.toml")));
        assert!(!result.valid);
        assert!(blueprint.is_none());
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_valid_file_with_warnings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daq.toml");
        std::fs::write(
            &path,
            "[acquisition]\nsource_mode = \"physical\"\ntarget_rate_hz = 50.0\n",
        )
        .unwrap();

        let (result, blueprint) = validate_config(&args(path));
        assert!(result.valid, "{:?}", result.error);
        assert!(blueprint.is_some());
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("physical")));
        assert_eq!(result.summary.unwrap().enabled_groups.len(), 4);
    }

    #[test]
    fn test_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daq.toml");
        std::fs::write(&path, "[acquisition]\ntarget_rate_hz = 0.0\n").unwrap();

        let (result, _) = validate_config(&args(path));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("target_rate_hz"));
    }
}
