// ==========================================
// 灾害救援物流系统 - 领域类型定义
// ==========================================
// 职责: 严重等级、路段状态、物资类型、节点标识
// 红线: 有效权重只由 base_time × 状态倍率 推导
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 严重等级 (Criticality Tier)
// ==========================================
// 由外部分级器给出,排序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    Low,    // baixa
    Medium, // média
    High,   // alta
}

impl Criticality {
    /// 解析分级器输出的等级标签
    ///
    /// 同时接受数据集原始标签（baixa/média/alta）与英文标签。
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "baixa" | "low" => Some(Criticality::Low),
            "média" | "media" | "medium" => Some(Criticality::Medium),
            "alta" | "high" => Some(Criticality::High),
            _ => None,
        }
    }

    /// 数据集标签（CSV 导出使用）
    pub fn dataset_label(&self) -> &'static str {
        match self {
            Criticality::Low => "baixa",
            Criticality::Medium => "média",
            Criticality::High => "alta",
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criticality::Low => write!(f, "LOW"),
            Criticality::Medium => write!(f, "MEDIUM"),
            Criticality::High => write!(f, "HIGH"),
        }
    }
}

/// 排序用的等级秩: 未分级 < Low < Medium < High
pub fn criticality_rank(tier: Option<Criticality>) -> i8 {
    match tier {
        None => -1,
        Some(Criticality::Low) => 0,
        Some(Criticality::Medium) => 1,
        Some(Criticality::High) => 2,
    }
}

// ==========================================
// 路段状态 (Route Status)
// ==========================================
// 无终态: 任意状态都可以再次被观测改写
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Free,    // livre
    Partial, // parcial
    Blocked, // bloqueada
}

impl RouteStatus {
    pub const ALL: [RouteStatus; 3] = [RouteStatus::Free, RouteStatus::Partial, RouteStatus::Blocked];

    /// 状态倍率
    ///
    /// # 返回
    /// - Some(1.0): free
    /// - Some(2.0): partial
    /// - None: blocked（不可通行）
    pub fn multiplier(&self) -> Option<f64> {
        match self {
            RouteStatus::Free => Some(1.0),
            RouteStatus::Partial => Some(2.0),
            RouteStatus::Blocked => None,
        }
    }

    pub fn is_traversable(&self) -> bool {
        self.multiplier().is_some()
    }

    /// 由基础通行时间推导有效权重
    pub fn effective_weight(&self, base_time_min: f64) -> Option<f64> {
        self.multiplier().map(|m| base_time_min * m)
    }

    /// 解析传感器/数据集状态标记（livre|parcial|bloqueada）
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "livre" => Some(RouteStatus::Free),
            "parcial" => Some(RouteStatus::Partial),
            "bloqueada" => Some(RouteStatus::Blocked),
            _ => None,
        }
    }

    /// 传感器/数据集状态标记
    pub fn token(&self) -> &'static str {
        match self {
            RouteStatus::Free => "livre",
            RouteStatus::Partial => "parcial",
            RouteStatus::Blocked => "bloqueada",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStatus::Free => write!(f, "FREE"),
            RouteStatus::Partial => write!(f, "PARTIAL"),
            RouteStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

// ==========================================
// 物资类型 (Resource Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Water,
    Food,
    Medicine,
}

impl ResourceKind {
    /// 固定遍历顺序
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Water, ResourceKind::Food, ResourceKind::Medicine];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Water => write!(f, "WATER"),
            ResourceKind::Food => write!(f, "FOOD"),
            ResourceKind::Medicine => write!(f, "MEDICINE"),
        }
    }
}

// ==========================================
// 物资数量包 (Resource Bundle)
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub water: u32,
    pub food: u32,
    pub medicine: u32,
}

impl ResourceBundle {
    pub fn new(water: u32, food: u32, medicine: u32) -> Self {
        Self { water, food, medicine }
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Water => self.water,
            ResourceKind::Food => self.food,
            ResourceKind::Medicine => self.medicine,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Water => &mut self.water,
            ResourceKind::Food => &mut self.food,
            ResourceKind::Medicine => &mut self.medicine,
        }
    }
}

// ==========================================
// 图节点标识 (Node Id)
// ==========================================
// 显示格式与数据集一致: 区域 "A{id}", 中心 "C{id}"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Area(u32),
    Center(u32),
}

impl NodeId {
    /// 解析 "A12" / "C3" 形式的节点标识
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (prefix, rest) = s.split_at(s.char_indices().nth(1).map(|(i, _)| i)?);
        let id: u32 = rest.parse().ok()?;
        match prefix {
            "A" => Some(NodeId::Area(id)),
            "C" => Some(NodeId::Center(id)),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Area(id) => write!(f, "A{}", id),
            NodeId::Center(id) => write!(f, "C{}", id),
        }
    }
}

/// 无序节点对的规范键（小者在前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePair(NodeId, NodeId);

impl NodePair {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            NodePair(a, b)
        } else {
            NodePair(b, a)
        }
    }

    pub fn first(&self) -> NodeId {
        self.0
    }

    pub fn second(&self) -> NodeId {
        self.1
    }

    /// 给定一端,返回另一端
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.0 == node {
            Some(self.1)
        } else if self.1 == node {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for NodePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_table() {
        assert_eq!(RouteStatus::Free.effective_weight(10.0), Some(10.0));
        assert_eq!(RouteStatus::Partial.effective_weight(10.0), Some(20.0));
        assert_eq!(RouteStatus::Blocked.effective_weight(10.0), None);
    }

    #[test]
    fn test_status_tokens() {
        for status in RouteStatus::ALL {
            assert_eq!(RouteStatus::from_token(status.token()), Some(status));
        }
        assert_eq!(RouteStatus::from_token("aberta"), None);
    }

    #[test]
    fn test_criticality_order() {
        assert!(Criticality::High > Criticality::Medium);
        assert!(Criticality::Medium > Criticality::Low);
        assert!(criticality_rank(None) < criticality_rank(Some(Criticality::Low)));
        assert_eq!(Criticality::parse_label("média"), Some(Criticality::Medium));
        assert_eq!(Criticality::parse_label("não classificada"), None);
    }

    #[test]
    fn test_node_pair_is_unordered() {
        let a = NodeId::Area(5);
        let b = NodeId::Area(7);
        assert_eq!(NodePair::new(a, b), NodePair::new(b, a));
        assert_eq!(NodePair::new(a, b).other(a), Some(b));
        assert_eq!(NodeId::parse("C3"), Some(NodeId::Center(3)));
        assert_eq!(NodeId::parse("A12").map(|n| n.to_string()), Some("A12".to_string()));
        assert_eq!(NodeId::parse("X1"), None);
    }
}
