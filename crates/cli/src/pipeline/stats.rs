//! Recording statistics.

use std::path::PathBuf;
use std::time::Duration;

use acquisition::{AcquisitionReport, StopReason};

/// Statistics from one recording run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Scheduler outcome (summary, tick metrics, stop reason)
    pub report: AcquisitionReport,

    /// Session directory
    pub session_path: PathBuf,

    /// Wall time including setup and finalization
    pub wall_time: Duration,

    /// Live snapshots logged, when enabled
    pub live_pushed: Option<u64>,
}

impl PipelineStats {
    fn stop_reason(&self) -> String {
        match &self.report.stop_reason {
            StopReason::Cancelled => "stopped by signal".to_string(),
            StopReason::SampleLimit => "sample limit reached".to_string(),
            StopReason::DurationLimit => "duration limit reached".to_string(),
            StopReason::StorageFailure(e) => format!("storage failure: {e}"),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let summary = &self.report.summary;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Session Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("Session {}", summary.session_id);
        println!("   ├─ Path: {}", self.session_path.display());
        println!("   ├─ Vehicle: {}", summary.vehicle.name);
        println!("   ├─ Source: {}", summary.source_mode);
        println!("   ├─ Duration: {:.2}s", summary.duration_seconds);
        println!("   ├─ Samples: {}", summary.samples_collected);
        println!("   ├─ Sensor errors: {}", summary.total_errors());
        println!("   └─ Stop: {}", self.stop_reason());

        println!("\n{}", self.report.metrics);

        if let Some(pushed) = self.live_pushed {
            println!("Live snapshots: {pushed}");
        }
        println!("Wall time: {:.2}s", self.wall_time.as_secs_f64());
        println!();
    }
}
