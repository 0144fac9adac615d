// ==========================================
// 灾害救援物流系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 内存实体表 + SQLite 快照/方案持久化
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod entity_store;
pub mod error;
pub mod plan_repo;
pub mod snapshot_repo;

// 重导出核心仓储
pub use entity_store::EntityStore;
pub use error::{RepositoryError, RepositoryResult};
pub use plan_repo::{PlanRepository, PlanVersionEntity};
pub use snapshot_repo::SnapshotRepository;
