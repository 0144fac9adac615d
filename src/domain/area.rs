// ==========================================
// 灾害救援物流系统 - 受灾区域领域模型
// ==========================================
// 红线: 区域数据只读,唯一例外是外部分级器写入一次的严重等级
// ==========================================

use crate::domain::types::{Criticality, NodeId, ResourceBundle};
use serde::{Deserialize, Serialize};

// ==========================================
// Area - 受灾区域
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: u32,
    pub name: String,

    // ===== 地理位置 =====
    pub latitude: f64,
    pub longitude: f64,

    // ===== 需求 =====
    pub population: u32,       // 受灾人数
    pub need: ResourceBundle,  // 各类物资需求

    // ===== 外部分级 =====
    pub criticality: Option<Criticality>, // None = 未分级
}

impl Area {
    pub fn node_id(&self) -> NodeId {
        NodeId::Area(self.id)
    }

    /// 坐标 (经度, 纬度)
    pub fn position(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}
