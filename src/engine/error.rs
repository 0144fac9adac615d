// ==========================================
// 灾害救援物流系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 引擎层错误全部可恢复,以返回值交给调用方
// ==========================================

use crate::domain::types::NodeId;
use thiserror::Error;

/// 路网错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("路段未找到: {a}-{b}")]
    RouteNotFound { a: NodeId, b: NodeId },

    #[error("无可达路径: from={from} to={to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("节点不存在: {0}")]
    NodeNotFound(NodeId),

    #[error("连接边不接受状态更新: {a}-{b}")]
    ConnectorNotUpdatable { a: NodeId, b: NodeId },
}

/// 传感器行协议解析错误（畸形观测）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservationError {
    #[error("缺少行协议标签: {0}")]
    MissingTag(String),

    #[error("字段数量错误: 期望 {expected}，实际 {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("整数字段无效 (field={field}): {value}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("未知路段状态: {0}")]
    UnknownStatus(String),

    #[error("读数超出范围 (field={field}): {value} 不在 [0, 4095]")]
    ReadingOutOfRange { field: &'static str, value: i64 },

    #[error("路段ID不存在: {0}")]
    UnknownRoute(usize),
}

/// Result 类型别名
pub type NetworkResult<T> = Result<T, NetworkError>;
