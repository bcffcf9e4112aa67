//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 脚本化 / 合成数据源的端到端测试（无需硬件）
//! - 存储故障下的收尾行为

#[cfg(test)]
mod contract_tests {
    use contracts::{standard_columns, DaqBlueprint, SensorGroup};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_blueprint_round_trips_through_loader() {
        let toml = config_loader::ConfigLoader::to_toml(&DaqBlueprint::default()).unwrap();
        let parsed =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(parsed.acquisition.target_rate_hz, 50.0);
        assert_eq!(parsed.sensors.temperature.probes.len(), 5);
    }

    #[test]
    fn test_header_covers_every_group() {
        let header = standard_columns();
        for group in SensorGroup::ALL {
            for field in contracts::group_fields(group) {
                assert!(header.iter().any(|c| c == field), "{field} missing");
            }
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use acquisition::{Scheduler, SchedulerHandle, StopReason};
    use analysis::generate_report;
    use chrono::Utc;
    use contracts::{
        AcquisitionConfig, AnalysisConfig, ContractError, DaqBlueprint, ProbeConfig, Reading,
        RecordStore, SensorAdapter, SensorGroup, SensorSample, SourceMode, StorageConfig,
        VehicleConfig,
    };
    use ingestion::{AdapterRegistry, ScriptedAdapter};
    use recorder::{session_columns, SessionCatalog, SessionDir, SessionWriter, SUMMARY_FILE};
    use tempfile::tempdir;

    fn storage(root: &Path) -> StorageConfig {
        StorageConfig {
            data_dir: root.to_path_buf(),
            batch_size: 25,
            max_pending_samples: 1_000,
        }
    }

    fn fast(max_samples: u64) -> AcquisitionConfig {
        AcquisitionConfig {
            target_rate_hz: 500.0,
            status_interval_sec: 60.0,
            max_samples: Some(max_samples),
            ..Default::default()
        }
    }

    /// End-to-end: ScriptedAdapter -> Scheduler -> SessionWriter -> Catalog -> Report
    ///
    /// 验证完整的数据流：
    /// 1. 脚本化适配器给出 0 -> 70 mph 的加速
    /// 2. 调度器按批次写入会话
    /// 3. 会话目录可被列出、加载并分析
    #[test]
    fn test_e2e_scripted_acceleration() {
        let root = tempdir().unwrap();

        let speeds: Vec<Reading> = (0..=70)
            .chain(std::iter::repeat(70).take(9))
            .map(|v| Reading::new().with("speed_mph", v as f64).with("rpm", 1500.0 + v as f64 * 60.0))
            .collect();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![
            Box::new(ScriptedAdapter::new(SensorGroup::VehicleBus).with_readings(speeds)),
            Box::new(
                ScriptedAdapter::new(SensorGroup::Inertial)
                    .with_reading(Reading::new().with("accel_long_g", 0.4)),
            ),
        ];

        let writer = SessionWriter::create(
            &storage(root.path()),
            session_columns(&[]),
            VehicleConfig::default(),
            SourceMode::Synthetic,
        )
        .unwrap();
        let report = Scheduler::new(&fast(80), adapters, writer, &[])
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(report.stop_reason, StopReason::SampleLimit);
        assert_eq!(report.summary.samples_collected, 80);

        let catalog = SessionCatalog::new(root.path());
        let latest = catalog.latest().unwrap().unwrap();
        assert_eq!(latest.name, report.summary.session_id);
        assert!(latest.summary.is_some());

        let record = catalog.load(&latest.name).unwrap();
        assert_eq!(record.len(), 80);
        // elapsed time is monotonic
        assert!(record
            .samples
            .windows(2)
            .all(|w| w[0].elapsed_time <= w[1].elapsed_time));

        let perf = generate_report(&record, &AnalysisConfig::default(), &VehicleConfig::default());
        assert!(perf.zero_to_sixty.found);
        assert_eq!(perf.zero_to_sixty.num_runs, 1);
        let best = perf.zero_to_sixty.best.unwrap();
        assert_eq!((best.start_idx, best.end_idx), (9, 60));
        assert!(perf.zero_to_sixty.time.unwrap() > 0.0);
        assert!((perf.zero_to_sixty.avg_g.unwrap() - 0.4).abs() < 1e-9);
        assert!(!perf.sixty_to_zero.found);
        assert_eq!(perf.max_values.max_speed_mph, Some(70.0));
        assert!(perf.power_curve.found);
    }

    /// Synthetic registry from a configuration file, run on its own thread
    #[test]
    fn test_e2e_synthetic_from_config() {
        let root = tempdir().unwrap();
        let toml = format!(
            r#"
[vehicle]
name = "test car"
mass_kg = 1500.0

[acquisition]
target_rate_hz = 200.0
max_samples = 120

[storage]
data_dir = "{}"
batch_size = 50
max_pending_samples = 500
"#,
            root.path().display().to_string().replace('\\', "/")
        );
        let blueprint: DaqBlueprint =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        let registry = AdapterRegistry::from_blueprint(&blueprint, Some(7));
        assert_eq!(registry.len(), 4);

        let probes = &blueprint.sensors.temperature.probes;
        let writer = SessionWriter::create(
            &blueprint.storage,
            session_columns(probes),
            blueprint.vehicle.clone(),
            blueprint.acquisition.source_mode,
        )
        .unwrap();
        let scheduler =
            Scheduler::new(&blueprint.acquisition, registry.into_adapters(), writer, probes)
                .unwrap();
        let report = SchedulerHandle::spawn(scheduler).unwrap().join().unwrap();

        assert_eq!(report.summary.samples_collected, 120);
        assert_eq!(report.summary.vehicle.name, "test car");
        assert_eq!(report.summary.errors.len(), 4);
        assert_eq!(report.metrics.total_ticks, 120);

        let record = SessionCatalog::new(root.path())
            .load(&report.summary.session_id)
            .unwrap();
        assert_eq!(record.len(), 120);
        assert!(record.samples.iter().any(|s| s.get("rpm").is_some()));
        assert!(record.samples.iter().any(|s| s.get("temp_oil_f").is_some()));

        let perf = generate_report(&record, &blueprint.analysis, &blueprint.vehicle);
        assert_eq!(perf.session_info.total_samples, 120);
        assert!(perf.max_values.max_rpm.is_some());
        assert!(perf.max_values.temperatures.contains_key("temp_oil_f_max"));
    }

    /// Store that never accepts a batch
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        fn append_batch(&mut self, _samples: &[SensorSample]) -> Result<(), ContractError> {
            Err(ContractError::store_write("broken", "disk full"))
        }

        fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[test]
    fn test_unwritable_storage_stops_and_still_summarizes() {
        let root = tempdir().unwrap();
        let dir = SessionDir::allocate(root.path(), Utc::now()).unwrap();
        let storage = StorageConfig {
            data_dir: root.path().to_path_buf(),
            batch_size: 10,
            max_pending_samples: 30,
        };
        let writer = SessionWriter::with_store(
            dir.clone(),
            BrokenStore,
            &storage,
            VehicleConfig::default(),
            SourceMode::Synthetic,
            Utc::now(),
        );
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![Box::new(
            ScriptedAdapter::new(SensorGroup::VehicleBus)
                .with_reading(Reading::new().with("rpm", 2500.0)),
        )];

        let report = Scheduler::new(&fast(1_000), adapters, writer, &[])
            .unwrap()
            .run()
            .unwrap();

        assert!(report.stop_reason.is_failure());
        assert!(report.summary.samples_collected < 1_000);
        assert!(report.metrics.flush_failures >= 2);
        assert!(dir.path.join(SUMMARY_FILE).exists());
    }

    #[test]
    fn test_temperature_alerts_are_edge_triggered() {
        let root = tempdir().unwrap();
        let readings: Vec<Reading> = [200.0, 240.0, 241.0, 270.0, 271.0, 200.0]
            .iter()
            .map(|t| Reading::new().with("temp_oil_f", *t))
            .collect();
        let adapters: Vec<Box<dyn SensorAdapter>> = vec![Box::new(
            ScriptedAdapter::new(SensorGroup::Temperature).with_readings(readings),
        )];
        let probes = [ProbeConfig::new("oil", "temp_oil_f", 230.0, 260.0, 180.0)];
        let writer = SessionWriter::create(
            &storage(root.path()),
            session_columns(&probes),
            VehicleConfig::default(),
            SourceMode::Synthetic,
        )
        .unwrap();

        let report = Scheduler::new(&fast(6), adapters, writer, &probes)
            .unwrap()
            .run()
            .unwrap();
        // normal -> warning -> critical; recovery is not an alert
        assert_eq!(report.metrics.temperature_alerts, 2);
        assert_eq!(report.summary.errors, BTreeMap::from([(SensorGroup::Temperature, 0)]));
    }
}
