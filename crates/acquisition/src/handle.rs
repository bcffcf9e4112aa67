//! SchedulerHandle - the acquisition loop on its own OS thread

use std::thread::JoinHandle;

use contracts::{LiveSnapshot, RecordStore};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::error::AcquisitionError;
use crate::scheduler::{AcquisitionReport, Scheduler};
use crate::stop::StopSignal;

/// Thread name of the acquisition loop
pub const ACQUISITION_THREAD: &str = "acquisition";

/// Running acquisition session
pub struct SchedulerHandle {
    stop: StopSignal,
    live_rx: watch::Receiver<LiveSnapshot>,
    thread: JoinHandle<Result<AcquisitionReport, AcquisitionError>>,
}

impl SchedulerHandle {
    /// Start the scheduler on a dedicated thread
    pub fn spawn<S: RecordStore + 'static>(
        scheduler: Scheduler<S>,
    ) -> Result<Self, AcquisitionError> {
        let stop = scheduler.stop_signal();
        let live_rx = scheduler.subscribe();
        let thread = std::thread::Builder::new()
            .name(ACQUISITION_THREAD.to_string())
            .spawn(move || scheduler.run())
            .map_err(|e| AcquisitionError::thread_spawn(e.to_string()))?;

        debug!("Acquisition thread spawned");
        Ok(Self {
            stop,
            live_rx,
            thread,
        })
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Request stop; returns immediately
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveSnapshot> {
        self.live_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the loop to exit and finalize
    pub fn join(self) -> Result<AcquisitionReport, AcquisitionError> {
        self.thread.join().map_err(|_| {
            error!("Acquisition thread panicked");
            AcquisitionError::ThreadPanicked
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::StopReason;
    use contracts::{
        AcquisitionConfig, Reading, SensorAdapter, SensorGroup, SourceMode, StorageConfig,
        VehicleConfig,
    };
    use ingestion::ScriptedAdapter;
    use recorder::{session_columns, SessionWriter};
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    #[test]
    fn test_stop_from_another_thread() {
        let root = tempdir().unwrap();
        let storage = StorageConfig {
            data_dir: root.path().to_path_buf(),
            ..Default::default()
        };
        let writer = SessionWriter::create(
            &storage,
            session_columns(&[]),
            VehicleConfig::default(),
            SourceMode::Synthetic,
        )
        .unwrap();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![Box::new(
            ScriptedAdapter::new(SensorGroup::VehicleBus)
                .with_reading(Reading::new().with("rpm", 1500.0)),
        )];
        let config = AcquisitionConfig {
            target_rate_hz: 100.0,
            ..Default::default()
        };
        let scheduler = Scheduler::new(&config, adapters, writer, &[]).unwrap();
        let handle = SchedulerHandle::spawn(scheduler).unwrap();

        std::thread::sleep(Duration::from_millis(200));
        assert!(!handle.is_finished());
        handle.stop();

        let report = handle.join().unwrap();
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert!(report.summary.samples_collected > 0);
        assert!(root
            .path()
            .join(&report.summary.session_id)
            .join(recorder::SUMMARY_FILE)
            .exists());
    }

    #[test]
    fn test_tick_count_follows_wall_clock() {
        let root = tempdir().unwrap();
        let storage = StorageConfig {
            data_dir: root.path().to_path_buf(),
            ..Default::default()
        };
        let writer = SessionWriter::create(
            &storage,
            session_columns(&[]),
            VehicleConfig::default(),
            SourceMode::Synthetic,
        )
        .unwrap();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![
            Box::new(
                ScriptedAdapter::new(SensorGroup::VehicleBus)
                    .with_reading(Reading::new().with("rpm", 2500.0)),
            ),
            Box::new(ScriptedAdapter::new(SensorGroup::Inertial).failing()),
        ];
        let config = AcquisitionConfig {
            target_rate_hz: 50.0,
            ..Default::default()
        };
        let scheduler = Scheduler::new(&config, adapters, writer, &[]).unwrap();

        let started = Instant::now();
        let handle = SchedulerHandle::spawn(scheduler).unwrap();
        std::thread::sleep(Duration::from_secs(1));
        handle.stop();
        let report = handle.join().unwrap();
        let elapsed = started.elapsed().as_secs_f64();

        let samples = report.summary.samples_collected;
        let expected = elapsed * config.target_rate_hz;
        assert!(
            (samples as f64 - expected).abs() <= expected * 0.2,
            "samples={samples} expected~{expected:.1}"
        );
        assert_eq!(
            report.summary.errors.get(&SensorGroup::Inertial),
            Some(&samples)
        );
        assert_eq!(report.summary.errors.get(&SensorGroup::VehicleBus), Some(&0));
    }
}
