//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `timestamp` is wall-clock UTC of the tick
//! - `elapsed_time` is seconds since session start and is the clock used by analysis

mod adapter;
mod blueprint;
mod error;
mod group;
mod sample;
mod store;
mod summary;

pub use adapter::{ReadOutcome, SensorAdapter};
pub use blueprint::*;
pub use error::*;
pub use group::{SensorGroup, SourceMode};
pub use sample::*;
pub use store::RecordStore;
pub use summary::*;
