// ==========================================
// 灾害救援物流系统 - 应用层
// ==========================================
// 职责: 命令行入口的运行环境（数据库路径等）
// ==========================================

pub mod state;

pub use state::{get_default_db_path, DB_PATH_ENV};
