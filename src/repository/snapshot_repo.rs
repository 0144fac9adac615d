// ==========================================
// 灾害救援物流系统 - 实体表快照仓储
// ==========================================
// 职责: area/center/route 三表整体读写,单路段状态回写
// 红线: Repository 不含业务逻辑
// ==========================================
// 持久化语义: 整体快照覆盖写,写入在同一事务内完成;
// 读→写之间崩溃保留旧快照,不提供部分写恢复
// ==========================================

use crate::domain::{Area, Center, Criticality, ResourceBundle, Route, RouteStatus};
use crate::repository::entity_store::EntityStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// SnapshotRepository - 实体表快照仓储
// ==========================================
pub struct SnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SnapshotRepository {
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整体覆盖写入快照
    pub fn save_snapshot(&self, store: &EntityStore) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM route", [])?;
        tx.execute("DELETE FROM area", [])?;
        tx.execute("DELETE FROM center", [])?;

        for (seq, area) in store.areas().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO area (
                    seq, area_id, name, latitude, longitude, population,
                    need_water, need_food, need_medicine, criticality
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    seq as i64,
                    area.id,
                    area.name,
                    area.latitude,
                    area.longitude,
                    area.population,
                    area.need.water,
                    area.need.food,
                    area.need.medicine,
                    area.criticality.map(|c| c.to_string()),
                ],
            )?;
        }

        for (seq, center) in store.centers().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO center (
                    seq, center_id, name, latitude, longitude,
                    stock_water, stock_food, stock_medicine, vehicles
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    seq as i64,
                    center.id,
                    center.name,
                    center.latitude,
                    center.longitude,
                    center.stock.water,
                    center.stock.food,
                    center.stock.medicine,
                    center.vehicles,
                ],
            )?;
        }

        for (route_id, route) in store.routes().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO route (
                    route_id, origin, destination, distance_km, base_time_min, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    route_id as i64,
                    route.origin,
                    route.destination,
                    route.distance_km,
                    route.base_time_min,
                    route.status.token(),
                ],
            )?;
        }

        tx.commit()?;
        info!(
            areas = store.areas().len(),
            centers = store.centers().len(),
            routes = store.routes().len(),
            "实体表快照已保存"
        );
        Ok(())
    }

    /// 读取快照
    pub fn load_snapshot(&self) -> RepositoryResult<EntityStore> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                area_id, name, latitude, longitude, population,
                need_water, need_food, need_medicine, criticality
            FROM area
            ORDER BY seq
            "#,
        )?;
        let raw_areas = stmt
            .query_map([], |row| {
                Ok((
                    Area {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        latitude: row.get(2)?,
                        longitude: row.get(3)?,
                        population: row.get(4)?,
                        need: ResourceBundle::new(row.get(5)?, row.get(6)?, row.get(7)?),
                        criticality: None,
                    },
                    row.get::<_, Option<String>>(8)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut areas = Vec::with_capacity(raw_areas.len());
        for (mut area, label) in raw_areas {
            area.criticality = match label {
                Some(label) => Some(Criticality::parse_label(&label).ok_or_else(|| {
                    RepositoryError::FieldValueError {
                        field: "criticality".to_string(),
                        message: format!("area_id={} 未知等级: {}", area.id, label),
                    }
                })?),
                None => None,
            };
            areas.push(area);
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT
                center_id, name, latitude, longitude,
                stock_water, stock_food, stock_medicine, vehicles
            FROM center
            ORDER BY seq
            "#,
        )?;
        let centers = stmt
            .query_map([], |row| {
                Ok(Center {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    stock: ResourceBundle::new(row.get(4)?, row.get(5)?, row.get(6)?),
                    vehicles: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT origin, destination, distance_km, base_time_min, status
            FROM route
            ORDER BY route_id
            "#,
        )?;
        let raw_routes = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut routes = Vec::with_capacity(raw_routes.len());
        for (origin, destination, distance_km, base_time_min, token) in raw_routes {
            let status = RouteStatus::from_token(&token).ok_or_else(|| RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("路段 A{}-A{} 未知状态: {}", origin, destination, token),
            })?;
            routes.push(Route {
                origin,
                destination,
                distance_km,
                base_time_min,
                status,
            });
        }

        EntityStore::new(areas, centers, routes)
    }

    /// 回写单个路段状态
    pub fn update_route_status(&self, route_id: usize, status: RouteStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE route SET status = ?1 WHERE route_id = ?2",
            params![status.token(), route_id as i64],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Route".to_string(),
                id: route_id.to_string(),
            });
        }
        Ok(())
    }
}
