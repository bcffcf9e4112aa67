//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Trackday - vehicle data acquisition and performance analysis
#[derive(Parser, Debug)]
#[command(
    name = "trackday",
    author,
    version,
    about = "Vehicle data acquisition and performance analysis",
    long_about = "Records engine, inertial, position and temperature sensors at a fixed rate \n\
                  into per-session directories, and derives acceleration, braking, \n\
                  quarter-mile, lap and power figures from recorded sessions."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TRACKDAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TRACKDAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new session until Ctrl-C or a configured limit
    Record(RecordArgs),

    /// Generate the performance report of a recorded session
    Analyze(AnalyzeArgs),

    /// List, compare or delete recorded sessions
    Sessions(SessionsArgs),

    /// Validate configuration file without recording
    Validate(ValidateArgs),
}

/// Arguments for the `record` command
#[derive(Parser, Debug, Clone)]
pub struct RecordArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when absent
    #[arg(short, long, env = "TRACKDAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the session root directory
    #[arg(long, env = "TRACKDAY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the acquisition rate (Hz)
    #[arg(long, env = "TRACKDAY_RATE_HZ")]
    pub rate_hz: Option<f64>,

    /// Stop after this many samples (0 = unlimited)
    #[arg(long, default_value = "0", env = "TRACKDAY_MAX_SAMPLES")]
    pub max_samples: u64,

    /// Stop after this many seconds (0 = unlimited)
    #[arg(long, default_value = "0", env = "TRACKDAY_DURATION")]
    pub duration: u64,

    /// Seed for synthetic sources (reproducible sessions)
    #[arg(long, env = "TRACKDAY_SEED")]
    pub seed: Option<u64>,

    /// Log the live snapshot at the configured push rate
    #[arg(long)]
    pub live: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TRACKDAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Session directory to analyze
    #[arg(conflicts_with = "latest", required_unless_present = "latest")]
    pub session: Option<PathBuf>,

    /// Analyze the most recent session under the data directory
    #[arg(long)]
    pub latest: bool,

    /// Configuration file providing thresholds and vehicle mass
    #[arg(short, long, env = "TRACKDAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the session root directory (with --latest)
    #[arg(long, env = "TRACKDAY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write the report to this file (default: <session>/report.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not write a report file
    #[arg(long, conflicts_with = "output")]
    pub no_save: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sessions` command
#[derive(Parser, Debug)]
pub struct SessionsArgs {
    /// Configuration file providing the data directory
    #[arg(short, long, global = true, env = "TRACKDAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the session root directory
    #[arg(long, global = true, env = "TRACKDAY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// List sessions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare peak metrics of two sessions
    Compare {
        /// First session name
        first: String,
        /// Second session name
        second: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a session directory
    Delete {
        /// Session name
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration (defaults filled in) as TOML
    #[arg(long)]
    pub print_config: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
