//! 适配器注册表
//!
//! 启动时按蓝图一次性决定每个传感器组的数据源：合成模式构造内置生成器；
//! 物理模式由调用方注册外部驱动，未注册的组以占位适配器代替。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{DaqBlueprint, SensorAdapter, SensorGroup, SourceMode};
use tracing::{info, warn};

use crate::adapters::{
    SyntheticInertial, SyntheticPosition, SyntheticTemperature, SyntheticVehicleBus,
    UnavailableAdapter,
};

/// 传感器组 -> 适配器
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<SensorGroup, Box<dyn SensorAdapter>>,
}

impl AdapterRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 按蓝图构造所有启用的传感器组
    ///
    /// `seed` 仅影响合成数据源，便于复现。
    pub fn from_blueprint(blueprint: &DaqBlueprint, seed: Option<u64>) -> Self {
        let mode = blueprint.acquisition.source_mode;
        let sensors = &blueprint.sensors;
        let mut registry = Self::new();

        let enabled = [
            (SensorGroup::VehicleBus, sensors.vehicle_bus.enabled),
            (SensorGroup::Inertial, sensors.inertial.enabled),
            (SensorGroup::Position, sensors.position.enabled),
            (SensorGroup::Temperature, sensors.temperature.enabled),
        ];

        for (idx, (group, on)) in enabled.into_iter().enumerate() {
            if !on {
                info!(group = %group, "Sensor group disabled");
                continue;
            }
            // 每组独立的种子，避免组间噪声相关
            let group_seed = seed.map(|s| s.wrapping_add(idx as u64));
            let adapter: Box<dyn SensorAdapter> = match (mode, group) {
                (SourceMode::Synthetic, SensorGroup::VehicleBus) => {
                    Box::new(SyntheticVehicleBus::new(group_seed))
                }
                (SourceMode::Synthetic, SensorGroup::Inertial) => {
                    Box::new(SyntheticInertial::new(&sensors.inertial, group_seed))
                }
                (SourceMode::Synthetic, SensorGroup::Position) => {
                    Box::new(SyntheticPosition::new(&sensors.position, group_seed))
                }
                (SourceMode::Synthetic, SensorGroup::Temperature) => Box::new(
                    SyntheticTemperature::new(&sensors.temperature.probes, group_seed),
                ),
                (SourceMode::Physical, SensorGroup::VehicleBus) => Box::new(
                    UnavailableAdapter::new(group, "no physical driver registered").with_device(
                        sensors.vehicle_bus.port.clone(),
                        Duration::from_millis(sensors.vehicle_bus.connect_timeout_ms),
                    ),
                ),
                (SourceMode::Physical, group) => Box::new(UnavailableAdapter::new(
                    group,
                    "no physical driver registered",
                )),
            };
            registry.register(adapter);
        }

        info!(
            source_mode = %mode,
            adapters = registry.len(),
            "Adapter registry built"
        );
        registry
    }

    /// 注册适配器，替换同组已有的适配器
    ///
    /// 物理驱动通过此方法注入。
    pub fn register(&mut self, adapter: Box<dyn SensorAdapter>) -> Option<Box<dyn SensorAdapter>> {
        let group = adapter.group();
        let previous = self.adapters.insert(group, adapter);
        if previous.is_some() {
            warn!(group = %group, "Replacing existing adapter");
        }
        previous
    }

    /// 移除某组适配器
    pub fn remove(&mut self, group: SensorGroup) -> Option<Box<dyn SensorAdapter>> {
        self.adapters.remove(&group)
    }

    /// 已注册的传感器组 (采集顺序)
    pub fn groups(&self) -> Vec<SensorGroup> {
        self.adapters.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// 按采集顺序取出全部适配器
    pub fn into_adapters(self) -> Vec<Box<dyn SensorAdapter>> {
        self.adapters.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedAdapter;

    #[test]
    fn test_synthetic_blueprint_builds_all_groups() {
        let registry = AdapterRegistry::from_blueprint(&DaqBlueprint::default(), Some(1));
        assert_eq!(registry.groups(), SensorGroup::ALL.to_vec());
        for adapter in registry.into_adapters() {
            assert_eq!(adapter.source_mode(), SourceMode::Synthetic);
        }
    }

    #[test]
    fn test_disabled_group_skipped() {
        let mut bp = DaqBlueprint::default();
        bp.sensors.position.enabled = false;
        let registry = AdapterRegistry::from_blueprint(&bp, None);
        assert!(!registry.groups().contains(&SensorGroup::Position));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_physical_without_driver_never_connects() {
        let mut bp = DaqBlueprint::default();
        bp.acquisition.source_mode = SourceMode::Physical;
        let registry = AdapterRegistry::from_blueprint(&bp, None);
        for mut adapter in registry.into_adapters() {
            assert_eq!(adapter.source_mode(), SourceMode::Physical);
            assert!(!adapter.connect());
        }
    }

    #[test]
    fn test_physical_vehicle_bus_carries_connect_timeout() {
        let mut bp = DaqBlueprint::default();
        bp.acquisition.source_mode = SourceMode::Physical;
        bp.sensors.vehicle_bus.connect_timeout_ms = 1_500;
        let registry = AdapterRegistry::from_blueprint(&bp, None);
        for adapter in registry.into_adapters() {
            let expected = (adapter.group() == SensorGroup::VehicleBus)
                .then(|| Duration::from_millis(1_500));
            assert_eq!(adapter.connect_timeout(), expected, "{}", adapter.group());
        }
    }

    #[test]
    fn test_register_replaces_group() {
        let mut registry = AdapterRegistry::from_blueprint(&DaqBlueprint::default(), Some(1));
        let previous = registry.register(Box::new(ScriptedAdapter::new(SensorGroup::Inertial)));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 4);
    }
}
