// ==========================================
// 灾害救援物流系统 - 路段领域模型
// ==========================================
// 红线: base_time 创建后不变,有效权重永远由状态重新推导
// ==========================================

use crate::domain::types::{NodeId, NodePair, RouteStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// Route - 区域间路段（无向）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin: u32,       // 起点区域ID
    pub destination: u32,  // 终点区域ID
    pub distance_km: f64,
    pub base_time_min: f64, // 基础通行时间（分钟）
    pub status: RouteStatus,
}

impl Route {
    pub fn pair(&self) -> NodePair {
        NodePair::new(NodeId::Area(self.origin), NodeId::Area(self.destination))
    }

    /// 是否连接给定的两个区域（不区分方向）
    pub fn connects(&self, a: u32, b: u32) -> bool {
        (self.origin == a && self.destination == b) || (self.origin == b && self.destination == a)
    }

    pub fn effective_weight(&self) -> Option<f64> {
        self.status.effective_weight(self.base_time_min)
    }
}
