// ==========================================
// 灾害救援物流系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误,转换为调用方可读的错误消息
// 红线: 所有错误均可恢复,以返回值交给调用方
// ==========================================

use crate::config::ConfigError;
use crate::engine::{MonitorRecord, NetworkError, ObservationError};
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 路网/观测错误
    // ==========================================
    #[error("路段未找到: {0}")]
    RouteNotFound(String),

    #[error("畸形观测: {0}")]
    MalformedObservation(#[from] ObservationError),

    #[error("路网错误: {0}")]
    Network(NetworkError),

    #[error("模拟监测在第 {} 条观测回写失败后中断: {source}", .records.len())]
    SimulationInterrupted {
        records: Vec<MonitorRecord>,
        source: Box<ApiError>,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 导入/配置错误
    // ==========================================
    #[error("数据导入导出失败: {0}")]
    ImportError(#[from] ImportError),

    #[error("配置错误: {0}")]
    ConfigError(#[from] ConfigError),
}

// ==========================================
// 从 NetworkError 转换
// ==========================================
impl From<NetworkError> for ApiError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::RouteNotFound { a, b } => ApiError::RouteNotFound(format!("{}-{}", a, b)),
            other => ApiError::Network(other),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound(format!("{}(id={})不存在", entity, id)),
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("{}: {}", field, message))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::from(RepositoryError::from(err))
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
