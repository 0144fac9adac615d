// ==========================================
// 灾害救援物流系统 - 动态路网
// ==========================================
// 职责: 由区域/中心/路段构建无向加权图,提供通行代价查询
// 红线: 边存在 ⇔ 状态可通行; 权重永远 = base_time × 倍率(status)
// 红线: 被封锁路段保留 base_time,可被重新插入
// ==========================================
// 确定性: 边与邻接表按插入顺序保存,最短路在等价路径中取先发现者
// ==========================================

use crate::domain::{Area, Center, NodeId, NodePair, Route, RouteStatus};
use crate::engine::error::{NetworkError, NetworkResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, instrument, warn};

// ==========================================
// NetworkConfig - 建图参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// 每个中心连接的区域数（按区域插入顺序取前 N 个,不是按距离）
    pub connector_area_count: usize,
    /// 原始坐标距离换算系数
    pub connector_distance_scale: f64,
    /// 连接边权重 = factor × 距离
    pub connector_weight_factor: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connector_area_count: 3,
            connector_distance_scale: 100.0,
            connector_weight_factor: 2.0,
        }
    }
}

// ==========================================
// 边记录
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Route,     // 数据集路段,受传感器更新
    Connector, // 中心→区域合成连接,建图后固定
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub kind: EdgeKind,
    pub status: RouteStatus,
    pub base_time_min: f64,
    weight: Option<f64>, // None = 不在图中（blocked）
}

impl EdgeRecord {
    fn new(kind: EdgeKind, status: RouteStatus, base_time_min: f64) -> Self {
        let mut record = Self {
            kind,
            status,
            base_time_min,
            weight: None,
        };
        record.recompute_weight();
        record
    }

    /// 从 base_time 重新推导权重（不做增量乘除）
    fn recompute_weight(&mut self) {
        self.weight = self.status.effective_weight(self.base_time_min);
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn is_present(&self) -> bool {
        self.weight.is_some()
    }
}

/// 最短路结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub path: Vec<NodeId>,
    pub total_weight: f64,
}

// ==========================================
// RouteGraph - 路网
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    nodes: Vec<NodeId>,
    positions: Vec<(f64, f64)>,
    node_index: HashMap<NodeId, usize>,

    // 全部已知边（含当前封锁的路段）,按插入顺序
    edges: Vec<(NodePair, EdgeRecord)>,
    edge_index: HashMap<NodePair, usize>,

    // 节点 → 边下标,按插入顺序
    adjacency: Vec<Vec<usize>>,
}

impl RouteGraph {
    /// 构建路网
    ///
    /// 1) 每个区域、每个中心一个节点
    /// 2) 每条路段一条边记录（封锁路段记录 base_time 但不在图中）
    /// 3) 每个中心连接前 N 个区域,权重 = factor × 距离 × scale
    #[instrument(skip_all, fields(
        areas = areas.len(),
        centers = centers.len(),
        routes = routes.len()
    ))]
    pub fn build(areas: &[Area], centers: &[Center], routes: &[Route], config: &NetworkConfig) -> Self {
        let mut graph = RouteGraph::default();

        for area in areas {
            graph.add_node(area.node_id(), area.position());
        }
        for center in centers {
            graph.add_node(center.node_id(), center.position());
        }

        for route in routes {
            let pair = route.pair();
            if !graph.contains_node(pair.first()) || !graph.contains_node(pair.second()) {
                warn!(pair = %pair, "路段端点不在区域表中,跳过");
                continue;
            }
            graph.upsert_edge(pair, EdgeRecord::new(EdgeKind::Route, route.status, route.base_time_min));
        }

        for center in centers {
            let (cx, cy) = center.position();
            for area in areas.iter().take(config.connector_area_count) {
                let (ax, ay) = area.position();
                let distance = ((cx - ax).powi(2) + (cy - ay).powi(2)).sqrt() * config.connector_distance_scale;
                let weight = distance * config.connector_weight_factor;
                graph.upsert_edge(
                    NodePair::new(center.node_id(), area.node_id()),
                    EdgeRecord::new(EdgeKind::Connector, RouteStatus::Free, weight),
                );
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "路网构建完成"
        );
        graph
    }

    fn add_node(&mut self, node: NodeId, position: (f64, f64)) {
        if self.node_index.contains_key(&node) {
            return;
        }
        self.node_index.insert(node, self.nodes.len());
        self.nodes.push(node);
        self.positions.push(position);
        self.adjacency.push(Vec::new());
    }

    // 重复的节点对覆盖已有记录,保留原插入位置
    fn upsert_edge(&mut self, pair: NodePair, record: EdgeRecord) {
        if let Some(&idx) = self.edge_index.get(&pair) {
            warn!(pair = %pair, "重复的边,覆盖已有记录");
            self.edges[idx].1 = record;
            return;
        }

        let idx = self.edges.len();
        self.edges.push((pair, record));
        self.edge_index.insert(pair, idx);
        for node in [pair.first(), pair.second()] {
            if let Some(&n) = self.node_index.get(&node) {
                self.adjacency[n].push(idx);
            }
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node_index.contains_key(&node)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 图中实际存在的边数（不含封锁路段）
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|(_, e)| e.is_present()).count()
    }

    pub fn position(&self, node: NodeId) -> Option<(f64, f64)> {
        self.node_index.get(&node).map(|&i| self.positions[i])
    }

    /// 边记录（封锁路段也返回,用于恢复）
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&EdgeRecord> {
        self.edge_index
            .get(&NodePair::new(a, b))
            .map(|&idx| &self.edges[idx].1)
    }

    /// 两节点间是否存在可通行边
    pub fn has_route(&self, a: NodeId, b: NodeId) -> bool {
        self.edge(a, b).is_some_and(|e| e.is_present())
    }

    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.edge(a, b).and_then(|e| e.weight())
    }

    /// 当前可通行的边（插入顺序）,供渲染/导出
    pub fn present_edges(&self) -> impl Iterator<Item = (NodePair, &EdgeRecord)> + '_ {
        self.edges
            .iter()
            .filter(|(_, e)| e.is_present())
            .map(|(pair, e)| (*pair, e))
    }

    // ==========================================
    // 变更（唯一的边存在/权重修改入口）
    // ==========================================

    /// 设置路段状态并按 base_time 重新推导权重
    ///
    /// # 返回
    /// - Ok(previous_status)
    /// - Err(RouteNotFound): 节点对没有路段也没有连接边
    /// - Err(ConnectorNotUpdatable): 连接边不接受状态更新
    pub fn set_status(&mut self, a: NodeId, b: NodeId, new_status: RouteStatus) -> NetworkResult<RouteStatus> {
        let idx = *self
            .edge_index
            .get(&NodePair::new(a, b))
            .ok_or(NetworkError::RouteNotFound { a, b })?;

        let record = &mut self.edges[idx].1;
        if record.kind == EdgeKind::Connector {
            return Err(NetworkError::ConnectorNotUpdatable { a, b });
        }

        let previous = record.status;
        record.status = new_status;
        record.recompute_weight();
        Ok(previous)
    }

    // ==========================================
    // 最短路（Dijkstra,非负权重）
    // ==========================================

    /// 计算 src → dst 最短路径
    ///
    /// 等价路径取先发现者: 只有严格更短才替换前驱,队列同代价按入队序出队。
    pub fn shortest_path(&self, src: NodeId, dst: NodeId) -> NetworkResult<PathResult> {
        let start = *self.node_index.get(&src).ok_or(NetworkError::NodeNotFound(src))?;
        let goal = *self.node_index.get(&dst).ok_or(NetworkError::NodeNotFound(dst))?;

        let mut dist: Vec<Option<f64>> = vec![None; self.nodes.len()];
        let mut prev: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut settled = vec![false; self.nodes.len()];
        let mut queue = BinaryHeap::new();
        let mut seq: u64 = 0;

        dist[start] = Some(0.0);
        queue.push(QueueEntry { cost: 0.0, seq, node: start });

        while let Some(QueueEntry { cost, node, .. }) = queue.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;

            if node == goal {
                return Ok(PathResult {
                    path: self.reconstruct_path(&prev, goal),
                    total_weight: cost,
                });
            }

            for &edge_idx in &self.adjacency[node] {
                let (pair, record) = &self.edges[edge_idx];
                let Some(weight) = record.weight() else {
                    continue; // blocked
                };
                let Some(neighbor) = pair.other(self.nodes[node]).and_then(|n| self.node_index.get(&n).copied()) else {
                    continue;
                };
                if settled[neighbor] {
                    continue;
                }

                let tentative = cost + weight;
                let improves = dist[neighbor].map_or(true, |existing| tentative < existing);
                if improves {
                    dist[neighbor] = Some(tentative);
                    prev[neighbor] = Some(node);
                    seq += 1;
                    queue.push(QueueEntry { cost: tentative, seq, node: neighbor });
                }
            }
        }

        Err(NetworkError::NoPath { from: src, to: dst })
    }

    fn reconstruct_path(&self, prev: &[Option<usize>], goal: usize) -> Vec<NodeId> {
        let mut path = vec![self.nodes[goal]];
        let mut current = goal;
        while let Some(p) = prev[current] {
            path.push(self.nodes[p]);
            current = p;
        }
        path.reverse();
        path
    }
}

// 最小堆条目: 代价升序,同代价按入队序
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceBundle;

    fn area(id: u32, lon: f64, lat: f64) -> Area {
        Area {
            id,
            name: format!("Área {}", id),
            latitude: lat,
            longitude: lon,
            population: 100,
            need: ResourceBundle::new(100, 100, 50),
            criticality: None,
        }
    }

    fn center(id: u32, lon: f64, lat: f64) -> Center {
        Center {
            id,
            name: format!("Centro {}", id),
            latitude: lat,
            longitude: lon,
            stock: ResourceBundle::new(1000, 1000, 500),
            vehicles: 3,
        }
    }

    fn route(origin: u32, destination: u32, base: f64, status: RouteStatus) -> Route {
        Route {
            origin,
            destination,
            distance_km: base / 2.0,
            base_time_min: base,
            status,
        }
    }

    #[test]
    fn test_build_skips_blocked_but_keeps_record() {
        let areas = vec![area(1, 0.0, 0.0), area(2, 0.1, 0.0), area(3, 0.2, 0.0)];
        let routes = vec![
            route(1, 2, 10.0, RouteStatus::Free),
            route(2, 3, 15.0, RouteStatus::Partial),
            route(1, 3, 40.0, RouteStatus::Blocked),
        ];
        let graph = RouteGraph::build(&areas, &[], &routes, &NetworkConfig::default());

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight(NodeId::Area(1), NodeId::Area(2)), Some(10.0));
        assert_eq!(graph.weight(NodeId::Area(3), NodeId::Area(2)), Some(30.0));
        assert!(!graph.has_route(NodeId::Area(1), NodeId::Area(3)));

        let blocked = graph.edge(NodeId::Area(1), NodeId::Area(3)).unwrap();
        assert_eq!(blocked.base_time_min, 40.0);
        assert_eq!(blocked.status, RouteStatus::Blocked);
    }

    #[test]
    fn test_connectors_use_insertion_order_not_distance() {
        // 第 4 个区域离中心最近,但只连接前 3 个
        let areas = vec![
            area(1, 1.0, 0.0),
            area(2, 2.0, 0.0),
            area(3, 3.0, 0.0),
            area(4, 0.0, 0.01),
        ];
        let centers = vec![center(1, 0.0, 0.0)];
        let graph = RouteGraph::build(&areas, &centers, &[], &NetworkConfig::default());

        assert!(graph.has_route(NodeId::Center(1), NodeId::Area(1)));
        assert!(graph.has_route(NodeId::Center(1), NodeId::Area(3)));
        assert!(!graph.has_route(NodeId::Center(1), NodeId::Area(4)));

        // 距离 1.0 × 100 × 2
        let w = graph.weight(NodeId::Center(1), NodeId::Area(1)).unwrap();
        assert!((w - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_status_recomputes_from_base() {
        let areas = vec![area(1, 0.0, 0.0), area(2, 0.1, 0.0)];
        let routes = vec![route(1, 2, 10.0, RouteStatus::Free)];
        let mut graph = RouteGraph::build(&areas, &[], &routes, &NetworkConfig::default());
        let (a, b) = (NodeId::Area(1), NodeId::Area(2));

        for _ in 0..5 {
            graph.set_status(a, b, RouteStatus::Partial).unwrap();
            assert_eq!(graph.weight(a, b), Some(20.0));
            graph.set_status(b, a, RouteStatus::Free).unwrap();
            assert_eq!(graph.weight(a, b), Some(10.0));
        }

        assert_eq!(graph.set_status(a, b, RouteStatus::Blocked), Ok(RouteStatus::Free));
        assert!(!graph.has_route(a, b));
        assert_eq!(graph.set_status(a, b, RouteStatus::Partial), Ok(RouteStatus::Blocked));
        assert_eq!(graph.weight(a, b), Some(20.0));
    }

    #[test]
    fn test_set_status_errors() {
        let areas = vec![area(1, 0.0, 0.0), area(2, 0.1, 0.0)];
        let centers = vec![center(1, 0.0, 0.0)];
        let mut graph = RouteGraph::build(&areas, &centers, &[], &NetworkConfig::default());

        assert_eq!(
            graph.set_status(NodeId::Area(1), NodeId::Area(2), RouteStatus::Free),
            Err(NetworkError::RouteNotFound {
                a: NodeId::Area(1),
                b: NodeId::Area(2)
            })
        );
        assert!(matches!(
            graph.set_status(NodeId::Center(1), NodeId::Area(1), RouteStatus::Blocked),
            Err(NetworkError::ConnectorNotUpdatable { .. })
        ));
        assert!(graph.has_route(NodeId::Center(1), NodeId::Area(1)));
    }

    #[test]
    fn test_shortest_path_prefers_cheaper_detour() {
        let areas = vec![area(1, 0.0, 0.0), area(2, 0.1, 0.0), area(3, 0.2, 0.0)];
        let routes = vec![
            route(1, 3, 50.0, RouteStatus::Free),
            route(1, 2, 10.0, RouteStatus::Free),
            route(2, 3, 15.0, RouteStatus::Free),
        ];
        let graph = RouteGraph::build(&areas, &[], &routes, &NetworkConfig::default());

        let result = graph.shortest_path(NodeId::Area(1), NodeId::Area(3)).unwrap();
        assert_eq!(result.path, vec![NodeId::Area(1), NodeId::Area(2), NodeId::Area(3)]);
        assert_eq!(result.total_weight, 25.0);
    }

    #[test]
    fn test_shortest_path_tie_is_stable() {
        // 两条等长路径: 1-2-4 与 1-3-4,先插入者胜出
        let areas = vec![area(1, 0.0, 0.0), area(2, 0.1, 0.0), area(3, 0.2, 0.0), area(4, 0.3, 0.0)];
        let routes = vec![
            route(1, 2, 10.0, RouteStatus::Free),
            route(1, 3, 10.0, RouteStatus::Free),
            route(2, 4, 10.0, RouteStatus::Free),
            route(3, 4, 10.0, RouteStatus::Free),
        ];
        let graph = RouteGraph::build(&areas, &[], &routes, &NetworkConfig::default());

        let first = graph.shortest_path(NodeId::Area(1), NodeId::Area(4)).unwrap();
        assert_eq!(first.path, vec![NodeId::Area(1), NodeId::Area(2), NodeId::Area(4)]);
        for _ in 0..10 {
            assert_eq!(graph.shortest_path(NodeId::Area(1), NodeId::Area(4)).unwrap(), first);
        }
    }

    #[test]
    fn test_shortest_path_no_path_and_unknown_node() {
        let areas = vec![area(1, 0.0, 0.0), area(2, 0.1, 0.0)];
        let routes = vec![route(1, 2, 10.0, RouteStatus::Blocked)];
        let graph = RouteGraph::build(&areas, &[], &routes, &NetworkConfig::default());

        assert_eq!(
            graph.shortest_path(NodeId::Area(1), NodeId::Area(2)),
            Err(NetworkError::NoPath {
                from: NodeId::Area(1),
                to: NodeId::Area(2)
            })
        );
        assert_eq!(
            graph.shortest_path(NodeId::Area(1), NodeId::Area(9)),
            Err(NetworkError::NodeNotFound(NodeId::Area(9)))
        );

        let same = graph.shortest_path(NodeId::Area(1), NodeId::Area(1)).unwrap();
        assert_eq!(same.path, vec![NodeId::Area(1)]);
        assert_eq!(same.total_weight, 0.0);
    }
}
