//! Scheduler - fixed-rate acquisition loop
//!
//! One tick: read every connected adapter in order, merge the partial
//! readings into one sample, append it, publish the live snapshot, then sleep
//! for what is left of the period. An overrun tick is followed immediately by
//! the next one; there is no catch-up burst.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use contracts::{
    AcquisitionConfig, LiveSnapshot, ProbeConfig, RecordStore, SensorAdapter, SensorGroup,
    SensorSample, SessionSummary,
};
use observability::{AcquisitionMetricsAggregator, AcquisitionSummary};
use recorder::{CsvRecordStore, SessionWriter, WriterMetricsSnapshot};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::alerts::TemperatureMonitor;
use crate::error::AcquisitionError;
use crate::stop::StopSignal;
use crate::window::TickWindow;

/// Ticks kept for the rolling status line
const TICK_WINDOW: usize = 256;

/// Why the loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// External stop request
    Cancelled,
    /// `max_samples` reached
    SampleLimit,
    /// `max_duration_sec` reached
    DurationLimit,
    /// Storage stayed unwritable past the retention cap
    StorageFailure(String),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::StorageFailure(_))
    }
}

/// Outcome of a finished session
#[derive(Debug, Clone)]
pub struct AcquisitionReport {
    pub summary: SessionSummary,
    pub metrics: AcquisitionSummary,
    pub stop_reason: StopReason,
}

/// Connect every adapter
///
/// Returns per-group connectivity. With `require_all`, any failed group is an
/// error and nothing stays connected.
pub fn connect_adapters(
    adapters: &mut [Box<dyn SensorAdapter>],
    require_all: bool,
) -> Result<BTreeMap<SensorGroup, bool>, AcquisitionError> {
    let mut status = BTreeMap::new();
    for adapter in adapters.iter_mut() {
        let group = adapter.group();
        let connect_start = Instant::now();
        let connected = adapter.connect();
        let took = connect_start.elapsed();
        if let Some(limit) = adapter.connect_timeout().filter(|limit| took > *limit) {
            warn!(
                group = %group,
                took_ms = took.as_millis() as u64,
                timeout_ms = limit.as_millis() as u64,
                "Sensor connect exceeded its timeout"
            );
        }
        if connected {
            info!(group = %group, source_mode = %adapter.source_mode(), "Sensor connected");
        } else {
            warn!(group = %group, "Sensor failed to connect, continuing without it");
        }
        observability::record_sensor_connected(group, connected);
        status.insert(group, connected);
    }

    let missing: Vec<SensorGroup> = status
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(g, _)| *g)
        .collect();
    if require_all && !missing.is_empty() {
        disconnect_adapters(adapters);
        return Err(AcquisitionError::SensorsUnavailable { groups: missing });
    }
    Ok(status)
}

/// Best-effort release; failures are logged only
pub fn disconnect_adapters(adapters: &mut [Box<dyn SensorAdapter>]) {
    for adapter in adapters.iter_mut() {
        let group = adapter.group();
        if let Err(e) = adapter.disconnect() {
            warn!(group = %group, error = %e, "Sensor disconnect failed");
        }
        observability::record_sensor_connected(group, false);
    }
}

/// Fixed-rate acquisition scheduler
pub struct Scheduler<S: RecordStore = CsvRecordStore> {
    config: AcquisitionConfig,
    adapters: Vec<Box<dyn SensorAdapter>>,
    writer: SessionWriter<S>,
    stop: StopSignal,
    monitor: TemperatureMonitor,
    live_tx: watch::Sender<LiveSnapshot>,
    period: Duration,
    status_interval: Duration,
}

impl<S: RecordStore> Scheduler<S> {
    pub fn new(
        config: &AcquisitionConfig,
        adapters: Vec<Box<dyn SensorAdapter>>,
        writer: SessionWriter<S>,
        probes: &[ProbeConfig],
    ) -> Result<Self, AcquisitionError> {
        let rate = config.target_rate_hz;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AcquisitionError::InvalidRate { rate });
        }
        let period = Duration::try_from_secs_f64(1.0 / rate)
            .map_err(|_| AcquisitionError::InvalidRate { rate })?;
        let seconds = config.status_interval_sec.max(0.1);
        let status_interval = Duration::try_from_secs_f64(seconds)
            .map_err(|_| AcquisitionError::InvalidStatusInterval { seconds })?;
        let (live_tx, _) = watch::channel(LiveSnapshot::default());
        Ok(Self {
            config: config.clone(),
            adapters,
            writer,
            stop: StopSignal::new(),
            monitor: TemperatureMonitor::new(probes),
            live_tx,
            period,
            status_interval,
        })
    }

    /// Share an externally owned stop flag
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Live snapshot receiver (latest merged sample only)
    pub fn subscribe(&self) -> watch::Receiver<LiveSnapshot> {
        self.live_tx.subscribe()
    }

    pub fn session_id(&self) -> &str {
        self.writer.session_id()
    }

    fn limit_reached(&self, samples: u64, elapsed: Duration) -> Option<StopReason> {
        if self.config.max_samples.is_some_and(|max| samples >= max) {
            return Some(StopReason::SampleLimit);
        }
        if self
            .config
            .max_duration_sec
            .is_some_and(|max| elapsed.as_secs_f64() >= max)
        {
            return Some(StopReason::DurationLimit);
        }
        None
    }

    /// Read every connected adapter into one sample
    fn read_tick(
        &mut self,
        sample: &mut SensorSample,
        errors: &mut BTreeMap<SensorGroup, u64>,
        aggregator: &mut AcquisitionMetricsAggregator,
    ) {
        for adapter in self.adapters.iter_mut() {
            if !adapter.is_connected() {
                continue;
            }
            let group = adapter.group();
            match adapter.read() {
                Ok(reading) => sample.merge(group, reading),
                Err(e) => {
                    *errors.entry(group).or_insert(0) += 1;
                    aggregator.record_error(group);
                    observability::record_sensor_read_error(group);
                    debug!(group = %group, error = %e, "Sensor read failed");
                }
            }
        }
    }

    fn connection_status(&self) -> BTreeMap<SensorGroup, bool> {
        self.adapters
            .iter()
            .map(|a| (a.group(), a.is_connected()))
            .collect()
    }

    /// Run until stopped, then finalize the session
    ///
    /// The summary is written exactly once, including after a fatal storage
    /// error. Adapters are always released.
    #[instrument(name = "scheduler_run", skip(self), fields(session = %self.writer.session_id()))]
    pub fn run(mut self) -> Result<AcquisitionReport, AcquisitionError> {
        connect_adapters(&mut self.adapters, self.config.require_all_sensors)?;

        let period = self.period;
        let status_interval = self.status_interval;
        let writer_metrics = self.writer.metrics();

        let mut errors: BTreeMap<SensorGroup, u64> =
            self.adapters.iter().map(|a| (a.group(), 0)).collect();
        let mut aggregator = AcquisitionMetricsAggregator::new();
        let mut window = TickWindow::new(TICK_WINDOW);
        let mut last_writer = WriterMetricsSnapshot::default();
        let mut samples: u64 = 0;

        info!(
            rate_hz = self.config.target_rate_hz,
            adapters = self.adapters.len(),
            "Acquisition started"
        );

        let started = Instant::now();
        let mut last_status = started;

        let stop_reason = loop {
            if self.stop.is_stopped() {
                info!("Stop requested");
                break StopReason::Cancelled;
            }
            if let Some(reason) = self.limit_reached(samples, started.elapsed()) {
                info!(reason = ?reason, samples, "Acquisition limit reached");
                break reason;
            }

            let tick_start = Instant::now();
            let mut sample = SensorSample::new(
                Some(Utc::now()),
                Some(tick_start.duration_since(started).as_secs_f64()),
            );
            self.read_tick(&mut sample, &mut errors, &mut aggregator);

            aggregator.temperature_alerts += self.monitor.check(&sample).len() as u64;

            let snapshot_sample = sample.clone();
            if let Err(e) = self.writer.append(sample) {
                if e.is_fatal() {
                    error!(error = %e, "Storage failure, stopping acquisition");
                    break StopReason::StorageFailure(e.to_string());
                }
                warn!(error = %e, "Sample append failed");
            } else {
                samples += 1;
            }

            self.live_tx.send_replace(LiveSnapshot {
                sample: snapshot_sample,
                connection_status: self.connection_status(),
                samples_collected: samples,
            });

            let current = writer_metrics.snapshot();
            if current.flush_count > last_writer.flush_count {
                let written = current.samples_written - last_writer.samples_written;
                observability::record_flush(true, written as usize);
            }
            for _ in last_writer.flush_failures..current.flush_failures {
                observability::record_flush(false, 0);
            }
            aggregator.flush_failures = current.flush_failures;
            observability::record_pending_samples(current.pending);
            last_writer = current;

            let tick_elapsed = tick_start.elapsed();
            let overrun = tick_elapsed > period;
            let tick_ms = tick_elapsed.as_secs_f64() * 1000.0;
            window.push(tick_ms);
            aggregator.update_tick(tick_ms, overrun, started.elapsed().as_secs_f64());
            observability::record_tick(tick_ms, overrun);
            if overrun {
                debug!(tick_ms, period_ms = period.as_secs_f64() * 1000.0, "Tick overrun");
            }

            if last_status.elapsed() >= status_interval {
                last_status = Instant::now();
                info!(
                    samples,
                    rate_hz = format!("{:.1}", aggregator.effective_rate()),
                    tick_ms_avg = format!("{:.2}", window.mean().unwrap_or(0.0)),
                    tick_ms_max = format!("{:.2}", window.max().unwrap_or(0.0)),
                    errors = ?errors,
                    pending = current.pending,
                    "Acquisition status"
                );
            }

            if let Some(remaining) = period.checked_sub(tick_elapsed) {
                std::thread::sleep(remaining);
            }
        };

        let summary = self.writer.finish(errors);
        disconnect_adapters(&mut self.adapters);
        let summary = summary?;

        let metrics = aggregator.summary();
        info!(
            samples = summary.samples_collected,
            duration_s = format!("{:.2}", summary.duration_seconds),
            rate_hz = format!("{:.1}", metrics.effective_rate_hz),
            errors = summary.total_errors(),
            reason = ?stop_reason,
            "Acquisition stopped"
        );

        Ok(AcquisitionReport {
            summary,
            metrics,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Reading, SourceMode, StorageConfig, VehicleConfig};
    use ingestion::ScriptedAdapter;
    use recorder::{load_dir, session_columns};
    use tempfile::tempdir;

    fn writer(root: &std::path::Path) -> SessionWriter {
        let storage = StorageConfig {
            data_dir: root.to_path_buf(),
            batch_size: 10,
            max_pending_samples: 1_000,
        };
        SessionWriter::create(
            &storage,
            session_columns(&[]),
            VehicleConfig::default(),
            SourceMode::Synthetic,
        )
        .unwrap()
    }

    fn config(rate: f64) -> AcquisitionConfig {
        AcquisitionConfig {
            target_rate_hz: rate,
            status_interval_sec: 60.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_zero_rate() {
        let root = tempdir().unwrap();
        let result = Scheduler::new(&config(0.0), Vec::new(), writer(root.path()), &[]);
        assert!(matches!(
            result,
            Err(AcquisitionError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_rejects_unrepresentable_durations() {
        let root = tempdir().unwrap();
        let result = Scheduler::new(&config(1e-20), Vec::new(), writer(root.path()), &[]);
        assert!(matches!(
            result,
            Err(AcquisitionError::InvalidRate { .. })
        ));

        let cfg = AcquisitionConfig {
            status_interval_sec: f64::INFINITY,
            ..config(50.0)
        };
        let result = Scheduler::new(&cfg, Vec::new(), writer(root.path()), &[]);
        assert!(matches!(
            result,
            Err(AcquisitionError::InvalidStatusInterval { .. })
        ));
    }

    #[test]
    fn test_failing_adapter_is_isolated() {
        let root = tempdir().unwrap();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![
            Box::new(
                ScriptedAdapter::new(SensorGroup::VehicleBus)
                    .with_reading(Reading::new().with("rpm", 3000.0)),
            ),
            Box::new(ScriptedAdapter::new(SensorGroup::Inertial).failing()),
        ];
        let cfg = AcquisitionConfig {
            max_samples: Some(40),
            ..config(200.0)
        };
        let scheduler = Scheduler::new(&cfg, adapters, writer(root.path()), &[]).unwrap();
        let report = scheduler.run().unwrap();

        assert_eq!(report.stop_reason, StopReason::SampleLimit);
        assert_eq!(report.summary.samples_collected, 40);
        assert_eq!(report.summary.errors.get(&SensorGroup::Inertial), Some(&40));
        assert_eq!(report.summary.errors.get(&SensorGroup::VehicleBus), Some(&0));

        let session = root.path().join(&report.summary.session_id);
        let record = load_dir(&session).unwrap();
        assert_eq!(record.len(), 40);
        assert!(record.samples.iter().all(|s| s.get("rpm") == Some(3000.0)));
        assert!(record.samples.iter().all(|s| s.get("accel_long_g").is_none()));
    }

    #[test]
    fn test_refused_connect_is_skipped_or_fatal() {
        let root = tempdir().unwrap();
        let refused = ScriptedAdapter::new(SensorGroup::Position).refusing_connect();
        let reads = refused.read_counter();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![Box::new(refused)];
        let cfg = AcquisitionConfig {
            max_samples: Some(5),
            ..config(500.0)
        };
        let report = Scheduler::new(&cfg, adapters, writer(root.path()), &[])
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(report.summary.samples_collected, 5);
        assert_eq!(reads.load(std::sync::atomic::Ordering::Relaxed), 0);

        let adapters: Vec<Box<dyn SensorAdapter>> = vec![Box::new(
            ScriptedAdapter::new(SensorGroup::Position).refusing_connect(),
        )];
        let cfg = AcquisitionConfig {
            require_all_sensors: true,
            ..cfg
        };
        let result = Scheduler::new(&cfg, adapters, writer(root.path()), &[])
            .unwrap()
            .run();
        assert!(matches!(
            result,
            Err(AcquisitionError::SensorsUnavailable { .. })
        ));
    }

    #[test]
    fn test_stop_before_first_tick_writes_empty_session() {
        let root = tempdir().unwrap();
        let scheduler = Scheduler::new(&config(50.0), Vec::new(), writer(root.path()), &[]).unwrap();
        let rx = scheduler.subscribe();
        scheduler.stop_signal().stop();

        let report = scheduler.run().unwrap();
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.summary.samples_collected, 0);
        assert_eq!(rx.borrow().samples_collected, 0);
    }

    #[test]
    fn test_live_snapshot_tracks_latest() {
        let root = tempdir().unwrap();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![Box::new(
            ScriptedAdapter::new(SensorGroup::VehicleBus).with_readings(vec![
                Reading::new().with("speed_mph", 10.0),
                Reading::new().with("speed_mph", 20.0),
            ]),
        )];
        let cfg = AcquisitionConfig {
            max_samples: Some(3),
            ..config(500.0)
        };
        let scheduler = Scheduler::new(&cfg, adapters, writer(root.path()), &[]).unwrap();
        let rx = scheduler.subscribe();
        scheduler.run().unwrap();

        let snapshot = rx.borrow();
        assert_eq!(snapshot.samples_collected, 3);
        assert_eq!(snapshot.sample.get("speed_mph"), Some(10.0));
        assert_eq!(
            snapshot.connection_status.get(&SensorGroup::VehicleBus),
            Some(&true)
        );
    }
}
