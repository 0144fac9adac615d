// ==========================================
// 灾害救援物流系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 灾后物资配送决策支持（路网监测 + 物资分配）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 路网/观测/分配
pub mod engine;

// 导入层 - CSV 数据集与导出
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 运行环境
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Criticality, NodeId, NodePair, ResourceBundle, ResourceKind, RouteStatus};

// 领域实体
pub use domain::{Area, AreaOutcome, Center, Delivery, Plan, Route, SensorObservation, UnservedReason};

// 引擎
pub use engine::{
    AllocationEngine, EdgeUpdateEngine, NetworkError, ObservationError, RouteGraph, SensorSimulator,
};

// 仓储
pub use repository::{EntityStore, PlanRepository, SnapshotRepository};

// API
pub use api::{ApiError, ApiResult, LogisticsApi, SensorUpdateOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "灾害救援物流系统";
