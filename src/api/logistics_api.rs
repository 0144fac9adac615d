// ==========================================
// 灾害救援物流系统 - 物流业务 API
// ==========================================
// 职责: 串联数据导入、路网维护、传感器观测、物资分配与方案落库
// 红线: 分配在中心表副本上执行,不改写快照中的库存与车辆
// 红线: 被拒绝的观测不修改路网、路段表与数据库
// ==========================================

use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, LogisticsConfig};
use crate::domain::{Plan, RouteStatus, SensorObservation, UnservedReason};
use crate::engine::{
    parse_sensor_line, AllocationEngine, EdgeAction, EdgeTransition, EdgeUpdateEngine, MonitorRecord, RouteGraph,
    SensorSimulator,
};
use crate::importer;
use crate::repository::{EntityStore, PlanRepository, SnapshotRepository};

/// 一条观测应用后的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdateOutcome {
    pub transition: EdgeTransition,
    /// 路段变为阻断时建议重新分配
    pub replan_recommended: bool,
}

/// 一次分配运行的结果
#[derive(Debug, Clone)]
pub struct AllocationRun {
    pub version_id: String,
    pub plan: Plan,
}

// ==========================================
// LogisticsApi - 物流业务 API
// ==========================================
pub struct LogisticsApi {
    conn: Arc<Mutex<Connection>>,
    config_manager: ConfigManager,
    snapshot_repo: SnapshotRepository,
    plan_repo: PlanRepository,
    edge_engine: EdgeUpdateEngine,
    config: LogisticsConfig,
    store: EntityStore,
    graph: RouteGraph,
}

impl LogisticsApi {
    /// 打开数据库文件并加载已有快照
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（建表幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            crate::db::init_schema(&guard)?;
        }

        let config_manager = ConfigManager::from_connection(conn.clone())?;
        let config = config_manager.load_logistics_config()?;
        let snapshot_repo = SnapshotRepository::from_connection(conn.clone());
        let plan_repo = PlanRepository::from_connection(conn.clone());
        let store = snapshot_repo.load_snapshot()?;
        let graph = RouteGraph::build(store.areas(), store.centers(), store.routes(), &config.network);

        info!(
            areas = store.areas().len(),
            centers = store.centers().len(),
            routes = store.routes().len(),
            "物流API已初始化"
        );

        Ok(Self {
            conn,
            config_manager,
            snapshot_repo,
            plan_repo,
            edge_engine: EdgeUpdateEngine::new(),
            config,
            store,
            graph,
        })
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    pub fn config(&self) -> &LogisticsConfig {
        &self.config
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn plan_repository(&self) -> &PlanRepository {
        &self.plan_repo
    }

    // ==========================================
    // 数据集与快照
    // ==========================================

    /// 从目录导入 CSV 数据集,覆盖快照并重建路网
    pub fn import_dataset(&mut self, dir: &Path) -> ApiResult<()> {
        let store = importer::load_dataset(dir)?;
        self.replace_store(store)
    }

    /// 以给定实体表覆盖快照并重建路网
    pub fn replace_store(&mut self, store: EntityStore) -> ApiResult<()> {
        self.snapshot_repo.save_snapshot(&store)?;
        self.store = store;
        self.rebuild_network();
        Ok(())
    }

    /// 从数据库重新读取快照
    pub fn load_snapshot(&mut self) -> ApiResult<()> {
        self.store = self.snapshot_repo.load_snapshot()?;
        self.rebuild_network();
        Ok(())
    }

    /// 按当前实体表与配置重建路网
    pub fn rebuild_network(&mut self) {
        self.graph = RouteGraph::build(
            self.store.areas(),
            self.store.centers(),
            self.store.routes(),
            &self.config.network,
        );
    }

    /// 更新一个配置项,重新加载配置并重建路网
    ///
    /// 新值无法解析时恢复原值并返回错误。
    pub fn update_config(&mut self, key: &str, value: &str) -> ApiResult<()> {
        let previous = self.config_manager.get_global_config_value(key)?;
        self.config_manager.set_global_config_value(key, value)?;

        match self.config_manager.load_logistics_config() {
            Ok(config) => {
                self.config = config;
                self.rebuild_network();
                info!(key, value, "配置已更新");
                Ok(())
            }
            Err(e) => {
                match previous {
                    Some(old) => self.config_manager.set_global_config_value(key, &old)?,
                    None => self.config_manager.delete_global_config_value(key)?,
                }
                warn!(key, value, error = %e, "配置值无效,已恢复");
                Err(e.into())
            }
        }
    }

    // ==========================================
    // 传感器观测
    // ==========================================

    /// 解析并应用一行传感器数据,成功后回写路段状态
    pub fn ingest_sensor_line(&mut self, line: &str) -> ApiResult<SensorUpdateOutcome> {
        let observation = match parse_sensor_line(line, &self.store) {
            Ok(obs) => obs,
            Err(e) => {
                warn!(line = line.trim(), error = %e, "传感器数据被拒绝");
                return Err(e.into());
            }
        };
        self.apply_observation(&observation)
    }

    /// 应用一条观测
    pub fn apply_observation(&mut self, observation: &SensorObservation) -> ApiResult<SensorUpdateOutcome> {
        let transition = self
            .edge_engine
            .apply(&mut self.graph, &mut self.store, observation)?;
        persist_transition(&self.snapshot_repo, &transition)?;

        let replan_recommended = transition.current == RouteStatus::Blocked;
        if replan_recommended {
            info!(pair = %transition.pair, "路段阻断,建议重新分配");
        }
        Ok(SensorUpdateOutcome {
            transition,
            replan_recommended,
        })
    }

    /// 运行传感器模拟,每条状态转换应用后立即回写
    ///
    /// 回写失败时停止模拟,返回 SimulationInterrupted: 其中除最后一条外均已落库。
    pub fn simulate_sensors(
        &mut self,
        simulator: &mut SensorSimulator,
        count: usize,
        interval: Duration,
    ) -> ApiResult<Vec<MonitorRecord>> {
        let snapshot_repo = &self.snapshot_repo;
        simulator
            .monitor(&mut self.graph, &mut self.store, &self.edge_engine, count, interval, |record| {
                match &record.result {
                    Ok(transition) => persist_transition(snapshot_repo, transition),
                    Err(_) => Ok(()),
                }
            })
            .map_err(|interrupted| ApiError::SimulationInterrupted {
                records: interrupted.records,
                source: Box::new(interrupted.error),
            })
    }

    // ==========================================
    // 物资分配
    // ==========================================

    /// 按当前路网生成配送方案并落库
    pub fn allocate(&self) -> ApiResult<AllocationRun> {
        let engine = AllocationEngine::new(self.config.allocation.clone());
        let mut centers = self.store.centers().to_vec();
        let plan = engine.allocate(&self.graph, self.store.areas(), &mut centers);
        let version_id = self.plan_repo.save_plan(&plan)?;
        info!(version_id = %version_id, deliveries = plan.len(), "配送方案已保存");
        Ok(AllocationRun { version_id, plan })
    }

    /// 读取最新落库的方案
    pub fn latest_plan(&self) -> ApiResult<Option<AllocationRun>> {
        let Some(version_id) = self.plan_repo.latest_version_id()? else {
            return Ok(None);
        };
        let plan = self
            .plan_repo
            .find_plan(&version_id)?
            .ok_or_else(|| ApiError::NotFound(format!("方案版本 {}", version_id)))?;
        Ok(Some(AllocationRun { version_id, plan }))
    }

    /// 方案文本摘要（前 summary_limit 条配送 + 未分配区域）
    pub fn plan_summary(&self, plan: &Plan) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "配送方案: 共 {} 条配送", plan.len());

        for (i, d) in plan.deliveries().iter().take(self.config.summary_limit).enumerate() {
            let criticality = d
                .criticality
                .map(|c| c.to_string())
                .unwrap_or_else(|| "UNCLASSIFIED".to_string());
            let _ = writeln!(out, "配送 {}:", i + 1);
            let _ = writeln!(out, "  中心: C{} → 区域: A{} ({})", d.center_id, d.area_id, criticality);
            let _ = writeln!(out, "  受益人数: {}", d.population_served);
            let _ = writeln!(
                out,
                "  物资: 水 {}, 食品 {}, 药品 {}",
                d.shipped.water, d.shipped.food, d.shipped.medicine
            );
            let _ = writeln!(out, "  路径: {}", d.path_label());
            let _ = writeln!(out, "  预计时间: {:.1} 分钟", d.travel_time_min);
        }
        if plan.len() > self.config.summary_limit {
            let _ = writeln!(out, "... 其余 {} 条省略", plan.len() - self.config.summary_limit);
        }

        for (area_id, reason) in plan.unserved_areas() {
            let reason = match reason {
                UnservedReason::NoEligibleCenter => "无满足准入条件的中心",
                UnservedReason::NoReachableCenter => "无可达中心",
            };
            let _ = writeln!(out, "未分配: A{} ({})", area_id, reason);
        }
        out
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 以当前状态重写路段表 CSV
    pub fn export_routes(&self, path: &Path) -> ApiResult<()> {
        importer::export_routes_csv(&self.store, path)?;
        Ok(())
    }

    /// 导出方案 CSV 与 JSON 到目录
    pub fn export_plan(&self, plan: &Plan, dir: &Path) -> ApiResult<()> {
        importer::export_plan_csv(plan, &dir.join(importer::PLAN_CSV_FILE))?;
        importer::export_plan_json(plan, &dir.join(importer::PLAN_JSON_FILE))?;
        Ok(())
    }
}

fn persist_transition(snapshot_repo: &SnapshotRepository, transition: &EdgeTransition) -> ApiResult<()> {
    if transition.action == EdgeAction::Unchanged {
        return Ok(());
    }
    if let Some(route_id) = transition.route_id {
        snapshot_repo.update_route_status(route_id, transition.current)?;
    }
    Ok(())
}
