// ==========================================
// 灾害救援物流系统 - 路段状态更新引擎
// ==========================================
// 职责: 把传感器观测落到路网与路段表
// 状态机: {free, partial, blocked},无终态
// ==========================================
// | prev    | observed       | 动作                          |
// | free    | partial        | weight = base × 2             |
// | partial | free           | weight = base × 1             |
// | any     | blocked        | 边移出图,保留 base            |
// | blocked | free/partial   | 边重新插入,weight = base × m  |
// | same    | same           | 按 base 重算（幂等）          |
// ==========================================

use crate::domain::{NodeId, NodePair, RouteStatus, SensorObservation};
use crate::engine::error::{NetworkError, NetworkResult};
use crate::engine::route_graph::RouteGraph;
use crate::repository::EntityStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument, warn};

// ==========================================
// 转换动作
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeAction {
    Reweighted, // 仍在图中,权重重算
    Removed,    // 封锁,移出图
    Reinserted, // 解除封锁,重新插入
    Unchanged,  // 同状态观测
}

impl fmt::Display for EdgeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeAction::Reweighted => write!(f, "REWEIGHTED"),
            EdgeAction::Removed => write!(f, "REMOVED"),
            EdgeAction::Reinserted => write!(f, "REINSERTED"),
            EdgeAction::Unchanged => write!(f, "UNCHANGED"),
        }
    }
}

/// 一次状态转换的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTransition {
    pub pair: NodePair,
    pub route_id: Option<usize>,
    pub previous: RouteStatus,
    pub current: RouteStatus,
    pub action: EdgeAction,
    pub weight: Option<f64>, // 转换后的有效权重
}

// ==========================================
// EdgeUpdateEngine - 路段状态更新引擎
// ==========================================
#[derive(Debug, Default)]
pub struct EdgeUpdateEngine {
    // 无状态引擎，不需要注入依赖
}

impl EdgeUpdateEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 按转换表判定动作
    pub fn classify(previous: RouteStatus, observed: RouteStatus) -> EdgeAction {
        if previous == observed {
            EdgeAction::Unchanged
        } else if observed == RouteStatus::Blocked {
            EdgeAction::Removed
        } else if previous == RouteStatus::Blocked {
            EdgeAction::Reinserted
        } else {
            EdgeAction::Reweighted
        }
    }

    /// 应用一条传感器观测
    ///
    /// 成功时同时更新路网边与路段表状态;
    /// 节点对既无路段也无连接边时返回 RouteNotFound,不做任何修改。
    #[instrument(skip(self, graph, store, observation), fields(
        origin = observation.origin,
        destination = observation.destination,
        status = %observation.status
    ))]
    pub fn apply(
        &self,
        graph: &mut RouteGraph,
        store: &mut EntityStore,
        observation: &SensorObservation,
    ) -> NetworkResult<EdgeTransition> {
        let a = NodeId::Area(observation.origin);
        let b = NodeId::Area(observation.destination);

        // 先定位,全部校验通过后再修改
        if graph.edge(a, b).is_none() {
            warn!(
                pair = %NodePair::new(a, b),
                water_level = observation.water_level,
                obstruction_level = observation.obstruction_level,
                "观测引用未知路段,忽略"
            );
            return Err(NetworkError::RouteNotFound { a, b });
        }

        let route_id = observation
            .route_id
            .filter(|&id| {
                store
                    .route_by_id(id)
                    .is_some_and(|r| r.connects(observation.origin, observation.destination))
            })
            .or_else(|| store.find_route(observation.origin, observation.destination));

        let previous = graph.set_status(a, b, observation.status)?;
        if let Some(id) = route_id {
            store.set_route_status(id, observation.status);
        }

        let transition = EdgeTransition {
            pair: NodePair::new(a, b),
            route_id,
            previous,
            current: observation.status,
            action: Self::classify(previous, observation.status),
            weight: graph.weight(a, b),
        };

        info!(
            pair = %transition.pair,
            from = %transition.previous,
            to = %transition.current,
            action = %transition.action,
            water_level = observation.water_level,
            obstruction_level = observation.obstruction_level,
            "路段状态更新"
        );

        Ok(transition)
    }
}
