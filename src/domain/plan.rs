// ==========================================
// 灾害救援物流系统 - 配送方案领域模型
// ==========================================
// 生命周期: 每次分配新建,构造后不可变,被下一次分配整体取代
// 红线: Plan 内不含随机ID/时间戳,保证同输入同输出
// ==========================================

use crate::domain::types::{Criticality, NodeId, ResourceBundle};
use serde::{Deserialize, Serialize};

// ==========================================
// Delivery - 一次中心→区域配送
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub center_id: u32,
    pub area_id: u32,
    pub criticality: Option<Criticality>, // 分配时的等级
    pub population_served: u32,
    pub shipped: ResourceBundle,
    pub path: Vec<NodeId>,
    pub travel_time_min: f64,
}

impl Delivery {
    /// 路径文本: "C1->A3->A2"
    pub fn path_label(&self) -> String {
        self.path
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("->")
    }
}

// ==========================================
// 区域分配结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnservedReason {
    NoEligibleCenter,   // 无中心同时满足车辆与库存准入
    NoReachableCenter,  // 有准入中心但均不可达
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaOutcome {
    Served { area_id: u32, delivery_index: usize },
    Unserved { area_id: u32, reason: UnservedReason },
}

impl AreaOutcome {
    pub fn area_id(&self) -> u32 {
        match self {
            AreaOutcome::Served { area_id, .. } | AreaOutcome::Unserved { area_id, .. } => *area_id,
        }
    }
}

// ==========================================
// Plan - 配送方案
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    deliveries: Vec<Delivery>,
    outcomes: Vec<AreaOutcome>, // 按处理顺序
}

impl Plan {
    pub(crate) fn from_parts(deliveries: Vec<Delivery>, outcomes: Vec<AreaOutcome>) -> Self {
        Self { deliveries, outcomes }
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn outcomes(&self) -> &[AreaOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn unserved_areas(&self) -> Vec<(u32, UnservedReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                AreaOutcome::Unserved { area_id, reason } => Some((*area_id, *reason)),
                AreaOutcome::Served { .. } => None,
            })
            .collect()
    }

    pub fn delivery_for_area(&self, area_id: u32) -> Option<&Delivery> {
        self.deliveries.iter().find(|d| d.area_id == area_id)
    }
}
