// ==========================================
// 灾害救援物流系统 - 物资分配引擎
// ==========================================
// 职责: 单遍贪心,按严重等级/受灾人数为每个区域挑选最近的合格中心
// 输入: 路网 + 区域表 + 中心表（会被修改）
// 输出: Plan（配送列表 + 每区域结果）
// ==========================================
// 红线: 同一次分配内不重复占用库存与车辆
// 红线: 不回溯,后处理区域看到的是已扣减的中心状态
// ==========================================

use crate::domain::types::criticality_rank;
use crate::domain::{Area, AreaOutcome, Center, Delivery, Plan, ResourceBundle, ResourceKind, UnservedReason};
use crate::engine::route_graph::{PathResult, RouteGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

// ==========================================
// AllocationConfig - 分配参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 准入阈值: 每类库存 ≥ 需求 × ratio
    pub admission_ratio: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self { admission_ratio: 0.5 }
    }
}

// ==========================================
// AllocationEngine - 物资分配引擎
// ==========================================
#[derive(Debug, Default)]
pub struct AllocationEngine {
    config: AllocationConfig,
}

impl AllocationEngine {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// 区域处理顺序
    ///
    /// 排序键:
    /// 1) 严重等级降序（未分级最后）
    /// 2) 受灾人数降序
    /// 3) 相同键保持输入顺序（稳定排序）
    pub fn order_areas<'a>(&self, areas: &'a [Area]) -> Vec<&'a Area> {
        let mut ordered: Vec<&Area> = areas.iter().collect();
        ordered.sort_by(|a, b| {
            criticality_rank(b.criticality)
                .cmp(&criticality_rank(a.criticality))
                .then_with(|| b.population.cmp(&a.population))
        });
        ordered
    }

    /// 生成配送方案
    ///
    /// 对每个区域按中心输入顺序扫描:
    /// - 无车辆 → 跳过
    /// - 任一类库存 < 需求 × ratio → 整体不准入
    /// - 不可达 → 跳过
    /// - 在准入且可达的中心中取总权重最小者,同权重取先扫描到的
    ///
    /// 选中后每类物资发送 min(需求, 库存),扣减库存与 1 辆车。
    #[instrument(skip_all, fields(areas = areas.len(), centers = centers.len()))]
    pub fn allocate(&self, graph: &RouteGraph, areas: &[Area], centers: &mut [Center]) -> Plan {
        let mut deliveries = Vec::new();
        let mut outcomes = Vec::with_capacity(areas.len());

        for area in self.order_areas(areas) {
            match self.select_center(graph, area, centers) {
                Ok((center_idx, route)) => {
                    let delivery = Self::dispatch(&mut centers[center_idx], area, route);
                    debug!(
                        area = %area.node_id(),
                        center = delivery.center_id,
                        travel_time_min = delivery.travel_time_min,
                        "区域已分配"
                    );
                    outcomes.push(AreaOutcome::Served {
                        area_id: area.id,
                        delivery_index: deliveries.len(),
                    });
                    deliveries.push(delivery);
                }
                Err(reason) => {
                    debug!(area = %area.node_id(), reason = ?reason, "区域未分配");
                    outcomes.push(AreaOutcome::Unserved {
                        area_id: area.id,
                        reason,
                    });
                }
            }
        }

        info!(
            served = deliveries.len(),
            unserved = outcomes.len() - deliveries.len(),
            "配送方案生成完成"
        );
        Plan::from_parts(deliveries, outcomes)
    }

    // ==========================================
    // 内部方法
    // ==========================================

    /// 选择中心（返回中心下标与路径）
    fn select_center(
        &self,
        graph: &RouteGraph,
        area: &Area,
        centers: &[Center],
    ) -> Result<(usize, PathResult), UnservedReason> {
        let mut any_eligible = false;
        let mut best: Option<(usize, PathResult)> = None;

        for (idx, center) in centers.iter().enumerate() {
            if !center.has_vehicle() {
                continue;
            }
            if let Some(kind) = center.first_shortfall(&area.need, self.config.admission_ratio) {
                debug!(center = %center.node_id(), area = %area.node_id(), shortfall = %kind, "库存未达准入阈值");
                continue;
            }
            any_eligible = true;

            let route = match graph.shortest_path(center.node_id(), area.node_id()) {
                Ok(route) => route,
                Err(e) => {
                    debug!(error = %e, "中心不可达");
                    continue;
                }
            };

            let better = best
                .as_ref()
                .map_or(true, |(_, current)| route.total_weight < current.total_weight);
            if better {
                best = Some((idx, route));
            }
        }

        match best {
            Some(found) => Ok(found),
            None if any_eligible => Err(UnservedReason::NoReachableCenter),
            None => Err(UnservedReason::NoEligibleCenter),
        }
    }

    /// 扣减中心资源并生成配送记录
    fn dispatch(center: &mut Center, area: &Area, route: PathResult) -> Delivery {
        let mut shipped = ResourceBundle::default();
        for kind in ResourceKind::ALL {
            let available = center.stock.get_mut(kind);
            let amount = area.need.get(kind).min(*available);
            *available -= amount;
            *shipped.get_mut(kind) = amount;
        }
        center.vehicles -= 1;

        Delivery {
            center_id: center.id,
            area_id: area.id,
            criticality: area.criticality,
            population_served: area.population,
            shipped,
            path: route.path,
            travel_time_min: route.total_weight,
        }
    }
}
