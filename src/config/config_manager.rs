// ==========================================
// 灾害救援物流系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::logistics_config::LogisticsConfig;
use crate::db::open_sqlite_connection;
use crate::engine::{AllocationConfig, NetworkConfig};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值格式错误 (key: {key}, value: {value})")]
    InvalidValue { key: String, value: String },

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("配置存储失败: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 路网
    pub const CONNECTOR_AREA_COUNT: &str = "network.connector_area_count";
    pub const CONNECTOR_DISTANCE_SCALE: &str = "network.connector_distance_scale";
    pub const CONNECTOR_WEIGHT_FACTOR: &str = "network.connector_weight_factor";

    // 分配
    pub const ADMISSION_RATIO: &str = "allocation.admission_ratio";

    // 方案摘要
    pub const SUMMARY_LIMIT: &str = "plan.summary_limit";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除 global scope 的配置值（恢复默认）
    pub fn delete_global_config_value(&self, key: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
        conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(())
    }

    /// 读取并解析配置值,不存在时返回默认值
    fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        }
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 类型化配置 =====

    /// 加载完整的物流配置（缺省键取默认值）
    pub fn load_logistics_config(&self) -> ConfigResult<LogisticsConfig> {
        let defaults = LogisticsConfig::default();

        let network = NetworkConfig {
            connector_area_count: self.get_parsed_or(
                config_keys::CONNECTOR_AREA_COUNT,
                defaults.network.connector_area_count,
            )?,
            connector_distance_scale: self.get_parsed_or(
                config_keys::CONNECTOR_DISTANCE_SCALE,
                defaults.network.connector_distance_scale,
            )?,
            connector_weight_factor: self.get_parsed_or(
                config_keys::CONNECTOR_WEIGHT_FACTOR,
                defaults.network.connector_weight_factor,
            )?,
        };

        ensure_non_negative(config_keys::CONNECTOR_DISTANCE_SCALE, network.connector_distance_scale)?;
        ensure_non_negative(config_keys::CONNECTOR_WEIGHT_FACTOR, network.connector_weight_factor)?;

        let admission_ratio: f64 =
            self.get_parsed_or(config_keys::ADMISSION_RATIO, defaults.allocation.admission_ratio)?;
        ensure_non_negative(config_keys::ADMISSION_RATIO, admission_ratio)?;

        Ok(LogisticsConfig {
            network,
            allocation: AllocationConfig { admission_ratio },
            summary_limit: self.get_parsed_or(config_keys::SUMMARY_LIMIT, defaults.summary_limit)?,
        })
    }
}

// 连接边权重与准入比例必须是有限非负数
fn ensure_non_negative(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
