// ==========================================
// 灾害救援物流系统 - 引擎层
// ==========================================
// 职责: 路网、路段状态机、物资分配、传感器数据
// 红线: Engine 不拼 SQL, 未分配区域必须给出原因
// ==========================================

pub mod allocation;
pub mod edge_update;
pub mod error;
pub mod route_graph;
pub mod sensor_line;
pub mod sensor_simulator;

// 重导出核心引擎
pub use allocation::{AllocationConfig, AllocationEngine};
pub use edge_update::{EdgeAction, EdgeTransition, EdgeUpdateEngine};
pub use error::{NetworkError, NetworkResult, ObservationError};
pub use route_graph::{EdgeKind, EdgeRecord, NetworkConfig, PathResult, RouteGraph};
pub use sensor_line::{parse_sensor_line, parse_sensor_line_at};
pub use sensor_simulator::{MonitorInterrupted, MonitorRecord, SensorSimulator};
