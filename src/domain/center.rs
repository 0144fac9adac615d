// ==========================================
// 灾害救援物流系统 - 配送中心领域模型
// ==========================================
// 红线: 库存与车辆只被分配引擎递减,不得为负
// ==========================================

use crate::domain::types::{NodeId, ResourceBundle, ResourceKind};
use serde::{Deserialize, Serialize};

// ==========================================
// Center - 配送中心
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub id: u32,
    pub name: String,

    // ===== 地理位置 =====
    pub latitude: f64,
    pub longitude: f64,

    // ===== 可变资源 =====
    pub stock: ResourceBundle, // 各类物资库存
    pub vehicles: u32,         // 可派车辆数（每次配送占用 1 辆）
}

impl Center {
    pub fn node_id(&self) -> NodeId {
        NodeId::Center(self.id)
    }

    /// 坐标 (经度, 纬度)
    pub fn position(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }

    pub fn has_vehicle(&self) -> bool {
        self.vehicles > 0
    }

    /// 准入检查: 每一类需求的库存都必须达到 need × ratio
    ///
    /// 任一类不达标即整体不准入（不做部分使用）。
    /// 返回第一类不达标的物资,全部达标时返回 None。
    pub fn first_shortfall(&self, need: &ResourceBundle, ratio: f64) -> Option<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .find(|&kind| (self.stock.get(kind) as f64) < need.get(kind) as f64 * ratio)
    }
}
