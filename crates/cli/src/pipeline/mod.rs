//! Recording pipeline: adapters -> scheduler thread -> session writer.

mod orchestrator;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
