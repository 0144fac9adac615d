// ==========================================
// 灾害救援物流系统 - 实体表（内存）
// ==========================================
// 职责: 区域/中心/路段三张表的内存真值
// 约定: 路段ID = 路段表行号（与传感器行协议一致）
// ==========================================

use crate::domain::{Area, Center, Criticality, Route, RouteStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::HashSet;

// ==========================================
// EntityStore - 实体表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    areas: Vec<Area>,
    centers: Vec<Center>,
    routes: Vec<Route>,
}

impl EntityStore {
    /// 创建实体表并校验引用完整性
    ///
    /// # 校验
    /// - 区域ID、中心ID不重复
    /// - 路段两端均为已知区域,且不是自环
    /// - 同一无序区域对只有一条路段
    pub fn new(areas: Vec<Area>, centers: Vec<Center>, routes: Vec<Route>) -> RepositoryResult<Self> {
        let mut area_ids = HashSet::new();
        for area in &areas {
            if !area_ids.insert(area.id) {
                return Err(RepositoryError::ValidationError(format!("区域ID重复: {}", area.id)));
            }
        }

        let mut center_ids = HashSet::new();
        for center in &centers {
            if !center_ids.insert(center.id) {
                return Err(RepositoryError::ValidationError(format!("中心ID重复: {}", center.id)));
            }
        }

        let mut pairs = HashSet::new();
        for (idx, route) in routes.iter().enumerate() {
            if route.origin == route.destination {
                return Err(RepositoryError::ValidationError(format!(
                    "路段 {} 为自环: A{}",
                    idx, route.origin
                )));
            }
            for end in [route.origin, route.destination] {
                if !area_ids.contains(&end) {
                    return Err(RepositoryError::ValidationError(format!(
                        "路段 {} 引用未知区域: A{}",
                        idx, end
                    )));
                }
            }
            let pair = (route.origin.min(route.destination), route.origin.max(route.destination));
            if !pairs.insert(pair) {
                return Err(RepositoryError::ValidationError(format!(
                    "路段 {} 重复连接区域对: A{}-A{}",
                    idx, pair.0, pair.1
                )));
            }
            if !(route.base_time_min.is_finite() && route.base_time_min >= 0.0) {
                return Err(RepositoryError::FieldValueError {
                    field: "base_time_min".to_string(),
                    message: format!("路段 {} 基础通行时间无效: {}", idx, route.base_time_min),
                });
            }
        }

        Ok(Self { areas, centers, routes })
    }

    // ===== 只读访问 =====

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn area(&self, id: u32) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn center(&self, id: u32) -> Option<&Center> {
        self.centers.iter().find(|c| c.id == id)
    }

    pub fn route_by_id(&self, route_id: usize) -> Option<&Route> {
        self.routes.get(route_id)
    }

    /// 按无序区域对查找路段ID
    pub fn find_route(&self, a: u32, b: u32) -> Option<usize> {
        self.routes.iter().position(|r| r.connects(a, b))
    }

    // ===== 变更 =====

    /// 更新路段状态
    ///
    /// # 返回
    /// - Some(previous_status)
    /// - None: 路段ID不存在
    pub fn set_route_status(&mut self, route_id: usize, status: RouteStatus) -> Option<RouteStatus> {
        self.routes
            .get_mut(route_id)
            .map(|route| std::mem::replace(&mut route.status, status))
    }

    /// 写入外部分级器给出的严重等级
    pub fn apply_criticality(&mut self, area_id: u32, tier: Criticality) -> RepositoryResult<()> {
        let area = self
            .areas
            .iter_mut()
            .find(|a| a.id == area_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Area".to_string(),
                id: area_id.to_string(),
            })?;
        area.criticality = Some(tier);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceBundle;

    fn area(id: u32) -> Area {
        Area {
            id,
            name: format!("Área {}", id),
            latitude: -23.6,
            longitude: -46.7,
            population: 100,
            need: ResourceBundle::new(100, 100, 50),
            criticality: None,
        }
    }

    fn route(origin: u32, destination: u32) -> Route {
        Route {
            origin,
            destination,
            distance_km: 10.0,
            base_time_min: 20.0,
            status: RouteStatus::Free,
        }
    }

    #[test]
    fn test_find_route_is_unordered() {
        let store = EntityStore::new(vec![area(1), area(2), area(3)], vec![], vec![route(1, 2), route(2, 3)]).unwrap();
        assert_eq!(store.find_route(2, 1), Some(0));
        assert_eq!(store.find_route(3, 2), Some(1));
        assert_eq!(store.find_route(1, 3), None);
    }

    #[test]
    fn test_rejects_route_to_unknown_area() {
        let result = EntityStore::new(vec![area(1)], vec![], vec![route(1, 2)]);
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_duplicate_route_pair_in_either_direction() {
        let result = EntityStore::new(vec![area(1), area(2)], vec![], vec![route(1, 2), route(2, 1)]);
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));

        let result = EntityStore::new(vec![area(1), area(2)], vec![], vec![route(1, 2), route(1, 2)]);
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_duplicate_area() {
        let result = EntityStore::new(vec![area(1), area(1)], vec![], vec![]);
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }

    #[test]
    fn test_set_route_status_returns_previous() {
        let mut store = EntityStore::new(vec![area(1), area(2)], vec![], vec![route(1, 2)]).unwrap();
        assert_eq!(store.set_route_status(0, RouteStatus::Blocked), Some(RouteStatus::Free));
        assert_eq!(store.routes()[0].status, RouteStatus::Blocked);
        assert_eq!(store.set_route_status(5, RouteStatus::Free), None);
    }

    #[test]
    fn test_apply_criticality() {
        let mut store = EntityStore::new(vec![area(1)], vec![], vec![]).unwrap();
        store.apply_criticality(1, Criticality::High).unwrap();
        assert_eq!(store.area(1).unwrap().criticality, Some(Criticality::High));
        assert!(store.apply_criticality(9, Criticality::Low).is_err());
    }
}
