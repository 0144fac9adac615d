// ==========================================
// 灾害救援物流系统 - 传感器模拟器
// ==========================================
// 职责: 在没有真实传感器时生成路段观测,并按间隔逐条应用
// 说明: 使用可播种随机数,测试中结果可复现
// ==========================================

use crate::domain::{RouteStatus, SensorObservation, SENSOR_READING_MAX};
use crate::engine::edge_update::{EdgeTransition, EdgeUpdateEngine};
use crate::engine::error::NetworkError;
use crate::engine::route_graph::RouteGraph;
use crate::repository::EntityStore;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{info, warn};

/// 一次模拟读数及其应用结果
#[derive(Debug, Clone)]
pub struct MonitorRecord {
    pub observation: SensorObservation,
    pub result: Result<EdgeTransition, NetworkError>,
}

// ==========================================
// SensorSimulator - 传感器模拟器
// ==========================================
pub struct SensorSimulator {
    rng: StdRng,
}

impl SensorSimulator {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// 随机选择一条路段并生成观测
    ///
    /// 路段表为空时返回 None。
    pub fn next_observation(&mut self, store: &EntityStore) -> Option<SensorObservation> {
        if store.routes().is_empty() {
            return None;
        }

        let route_id = self.rng.random_range(0..store.routes().len());
        let route = store.route_by_id(route_id)?;
        let status = RouteStatus::ALL[self.rng.random_range(0..RouteStatus::ALL.len())];

        Some(SensorObservation {
            route_id: Some(route_id),
            origin: route.origin,
            destination: route.destination,
            status,
            water_level: self.rng.random_range(0..=SENSOR_READING_MAX),
            obstruction_level: self.rng.random_range(0..=SENSOR_READING_MAX),
            observed_at: Utc::now(),
        })
    }

    /// 模拟连续监测: 生成并应用 count 条观测,两条之间等待 interval
    ///
    /// 每条观测应用后调用 on_record。回调返回错误时立即停止,
    /// 已产生的记录（含回调失败的那一条,位于末尾）随错误一起返回。
    pub fn monitor<E>(
        &mut self,
        graph: &mut RouteGraph,
        store: &mut EntityStore,
        engine: &EdgeUpdateEngine,
        count: usize,
        interval: Duration,
        mut on_record: impl FnMut(&MonitorRecord) -> Result<(), E>,
    ) -> Result<Vec<MonitorRecord>, MonitorInterrupted<E>> {
        info!(count, interval_ms = interval.as_millis() as u64, "开始模拟监测");
        let mut records = Vec::with_capacity(count);

        for i in 0..count {
            let Some(observation) = self.next_observation(store) else {
                break;
            };
            let result = engine.apply(graph, store, &observation);
            records.push(MonitorRecord { observation, result });

            if let Some(record) = records.last() {
                if let Err(error) = on_record(record) {
                    warn!(applied = records.len(), "模拟监测中断");
                    return Err(MonitorInterrupted { records, error });
                }
            }

            if i + 1 < count && !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }

        info!(applied = records.len(), "模拟监测结束");
        Ok(records)
    }
}

/// 监测被回调错误中断
#[derive(Debug)]
pub struct MonitorInterrupted<E> {
    pub records: Vec<MonitorRecord>,
    pub error: E,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Area, NodeId, ResourceBundle, Route};
    use crate::engine::route_graph::NetworkConfig;

    fn store() -> EntityStore {
        let areas = (1..=4)
            .map(|id| Area {
                id,
                name: format!("Área {}", id),
                latitude: 0.0,
                longitude: id as f64,
                population: 10,
                need: ResourceBundle::default(),
                criticality: None,
            })
            .collect();
        let routes = vec![(1, 2, 10.0), (2, 3, 20.0), (3, 4, 30.0)]
            .into_iter()
            .map(|(origin, destination, base_time_min)| Route {
                origin,
                destination,
                distance_km: base_time_min / 3.0,
                base_time_min,
                status: RouteStatus::Free,
            })
            .collect();
        EntityStore::new(areas, vec![], routes).unwrap()
    }

    #[test]
    fn test_same_seed_same_observations() {
        let store = store();
        let mut a = SensorSimulator::with_seed(42);
        let mut b = SensorSimulator::with_seed(42);
        for _ in 0..20 {
            let oa = a.next_observation(&store).unwrap();
            let ob = b.next_observation(&store).unwrap();
            assert_eq!(oa.route_id, ob.route_id);
            assert_eq!(oa.status, ob.status);
            assert_eq!(oa.water_level, ob.water_level);
            assert!(oa.water_level <= SENSOR_READING_MAX);
        }
    }

    #[test]
    fn test_monitor_keeps_graph_and_store_in_sync() {
        let mut store = store();
        let mut graph = RouteGraph::build(store.areas(), store.centers(), store.routes(), &NetworkConfig::default());
        let engine = EdgeUpdateEngine::new();
        let mut sim = SensorSimulator::with_seed(7);

        let mut seen = 0;
        let records = sim
            .monitor(&mut graph, &mut store, &engine, 25, Duration::ZERO, |_| {
                seen += 1;
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(records.len(), 25);
        assert_eq!(seen, 25);
        assert!(records.iter().all(|r| r.result.is_ok()));

        for route in store.routes() {
            let (a, b) = (NodeId::Area(route.origin), NodeId::Area(route.destination));
            assert_eq!(graph.weight(a, b), route.effective_weight());
            assert_eq!(graph.has_route(a, b), route.status.is_traversable());
        }
    }

    #[test]
    fn test_monitor_stops_at_first_callback_error() {
        let mut store = store();
        let mut graph = RouteGraph::build(store.areas(), store.centers(), store.routes(), &NetworkConfig::default());
        let engine = EdgeUpdateEngine::new();
        let mut sim = SensorSimulator::with_seed(7);

        let mut calls = 0;
        let interrupted = sim
            .monitor(&mut graph, &mut store, &engine, 25, Duration::ZERO, |_| {
                calls += 1;
                if calls == 4 {
                    Err("写入失败")
                } else {
                    Ok(())
                }
            })
            .unwrap_err();

        assert_eq!(interrupted.error, "写入失败");
        assert_eq!(interrupted.records.len(), 4);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_empty_route_table() {
        let mut sim = SensorSimulator::with_seed(1);
        assert!(sim.next_observation(&EntityStore::default()).is_none());
    }
}
