// ==========================================
// 灾害救援物流系统 - 传感器观测
// ==========================================
// 说明: 水位/阻塞读数只用于日志与遥测,不参与状态推导
// ==========================================

use crate::domain::types::RouteStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 传感器读数上限（12 位 ADC）
pub const SENSOR_READING_MAX: u16 = 4095;

/// 行协议标签
pub const SENSOR_LINE_TAG: &str = "DADOS_SENSOR";

// ==========================================
// SensorObservation - 单条路段观测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorObservation {
    pub route_id: Option<usize>, // 路段表行号（行协议给出时）
    pub origin: u32,
    pub destination: u32,
    pub status: RouteStatus,
    pub water_level: u16,
    pub obstruction_level: u16,
    pub observed_at: DateTime<Utc>,
}

impl SensorObservation {
    /// 序列化为行协议: DADOS_SENSOR:route_id:status:water:obstruction
    ///
    /// 没有 route_id 的观测无法编码,返回 None。
    pub fn to_line(&self) -> Option<String> {
        self.route_id.map(|route_id| {
            format!(
                "{}:{}:{}:{}:{}",
                SENSOR_LINE_TAG,
                route_id,
                self.status.token(),
                self.water_level,
                self.obstruction_level
            )
        })
    }
}
