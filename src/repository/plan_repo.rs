// ==========================================
// 灾害救援物流系统 - 配送方案仓储
// ==========================================
// 职责: plan_version / plan_delivery 表读写
// 说明: 版本ID与创建时间在落库时生成,不进入 Plan 值本身
// ==========================================

use crate::domain::{AreaOutcome, Criticality, Delivery, NodeId, Plan, ResourceBundle};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 方案版本摘要
#[derive(Debug, Clone, PartialEq)]
pub struct PlanVersionEntity {
    pub version_id: String,
    pub created_at: String,
    pub delivery_count: usize,
    pub unserved_count: usize,
}

// ==========================================
// PlanRepository - 配送方案仓储
// ==========================================
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    /// 创建仓储实例（打开数据库并建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存方案,返回新版本ID
    pub fn save_plan(&self, plan: &Plan) -> RepositoryResult<String> {
        let version_id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let outcomes_json = serde_json::to_string(plan.outcomes())?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO plan_version (
                version_id, created_at, delivery_count, unserved_count, outcomes_json
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                version_id,
                created_at,
                plan.len() as i64,
                plan.unserved_areas().len() as i64,
                outcomes_json,
            ],
        )?;

        for (seq_no, d) in plan.deliveries().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO plan_delivery (
                    version_id, seq_no, center_id, area_id, criticality, population_served,
                    shipped_water, shipped_food, shipped_medicine, path, travel_time_min
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    version_id,
                    seq_no as i64,
                    d.center_id,
                    d.area_id,
                    d.criticality.map(|c| c.to_string()),
                    d.population_served,
                    d.shipped.water,
                    d.shipped.food,
                    d.shipped.medicine,
                    d.path_label(),
                    d.travel_time_min,
                ],
            )?;
        }

        tx.commit()?;
        Ok(version_id)
    }

    /// 最新版本ID
    pub fn latest_version_id(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let id = conn
            .query_row(
                "SELECT version_id FROM plan_version ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// 版本列表（新→旧）
    pub fn list_versions(&self) -> RepositoryResult<Vec<PlanVersionEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT version_id, created_at, delivery_count, unserved_count
            FROM plan_version
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;
        let versions = stmt
            .query_map([], |row| {
                Ok(PlanVersionEntity {
                    version_id: row.get(0)?,
                    created_at: row.get(1)?,
                    delivery_count: row.get::<_, i64>(2)? as usize,
                    unserved_count: row.get::<_, i64>(3)? as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(versions)
    }

    /// 按版本读取配送列表（按 seq_no）
    pub fn find_deliveries(&self, version_id: &str) -> RepositoryResult<Vec<Delivery>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                center_id, area_id, criticality, population_served,
                shipped_water, shipped_food, shipped_medicine, path, travel_time_min
            FROM plan_delivery
            WHERE version_id = ?1
            ORDER BY seq_no
            "#,
        )?;
        let raw = stmt
            .query_map(params![version_id], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, u32>(3)?,
                    ResourceBundle::new(row.get(4)?, row.get(5)?, row.get(6)?),
                    row.get::<_, String>(7)?,
                    row.get::<_, f64>(8)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(center_id, area_id, criticality, population_served, shipped, path, travel_time_min)| {
                Ok(Delivery {
                    center_id,
                    area_id,
                    criticality: criticality.as_deref().and_then(Criticality::parse_label),
                    population_served,
                    shipped,
                    path: parse_path(&path)?,
                    travel_time_min,
                })
            })
            .collect()
    }

    /// 按版本还原完整方案
    pub fn find_plan(&self, version_id: &str) -> RepositoryResult<Option<Plan>> {
        let outcomes_json: Option<String> = {
            let conn = self.get_conn()?;
            conn.query_row(
                "SELECT outcomes_json FROM plan_version WHERE version_id = ?1",
                params![version_id],
                |row| row.get(0),
            )
            .optional()?
        };

        let Some(outcomes_json) = outcomes_json else {
            return Ok(None);
        };
        let outcomes: Vec<AreaOutcome> = serde_json::from_str(&outcomes_json)?;
        let deliveries = self.find_deliveries(version_id)?;
        Ok(Some(Plan::from_parts(deliveries, outcomes)))
    }
}

fn parse_path(path: &str) -> RepositoryResult<Vec<NodeId>> {
    path.split("->")
        .map(|s| {
            NodeId::parse(s).ok_or_else(|| RepositoryError::FieldValueError {
                field: "path".to_string(),
                message: format!("无效节点: {}", s),
            })
        })
        .collect()
}
