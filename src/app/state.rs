// ==========================================
// 灾害救援物流系统 - 运行环境
// ==========================================

use std::path::PathBuf;

/// 显式指定数据库路径的环境变量
pub const DB_PATH_ENV: &str = "RELIEF_LOGISTICS_DB_PATH";

const DB_FILE_NAME: &str = "relief_logistics.db";

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("relief-logistics-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("relief-logistics");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
