// ==========================================
// 灾害救援物流系统 - 类型化配置
// ==========================================

use crate::engine::{AllocationConfig, NetworkConfig};
use serde::{Deserialize, Serialize};

/// 物流系统配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsConfig {
    pub network: NetworkConfig,
    pub allocation: AllocationConfig,
    /// 方案摘要展示的配送条数
    pub summary_limit: usize,
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            allocation: AllocationConfig::default(),
            summary_limit: 5,
        }
    }
}
