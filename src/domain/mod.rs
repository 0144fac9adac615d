// ==========================================
// 灾害救援物流系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod area;
pub mod center;
pub mod observation;
pub mod plan;
pub mod route;
pub mod types;

// 重导出核心类型
pub use area::Area;
pub use center::Center;
pub use observation::{SensorObservation, SENSOR_LINE_TAG, SENSOR_READING_MAX};
pub use plan::{AreaOutcome, Delivery, Plan, UnservedReason};
pub use route::Route;
pub use types::{Criticality, NodeId, NodePair, ResourceBundle, ResourceKind, RouteStatus};
