// ==========================================
// 灾害救援物流系统 - 传感器行协议解析
// ==========================================
// 格式: DADOS_SENSOR:<route_id>:<livre|parcial|bloqueada>:<water>:<obstruction>
// 读数范围: 0..=4095
// 红线: 畸形行只报告,不修改任何状态
// ==========================================

use crate::domain::{RouteStatus, SensorObservation, SENSOR_LINE_TAG, SENSOR_READING_MAX};
use crate::engine::error::ObservationError;
use crate::repository::EntityStore;
use chrono::{DateTime, Utc};

const FIELD_COUNT: usize = 5;

/// 解析一行传感器数据,观测时间取当前时间
pub fn parse_sensor_line(line: &str, store: &EntityStore) -> Result<SensorObservation, ObservationError> {
    parse_sensor_line_at(line, store, Utc::now())
}

/// 解析一行传感器数据（指定观测时间）
pub fn parse_sensor_line_at(
    line: &str,
    store: &EntityStore,
    observed_at: DateTime<Utc>,
) -> Result<SensorObservation, ObservationError> {
    let line = line.trim();
    let parts: Vec<&str> = line.split(':').collect();

    if parts[0] != SENSOR_LINE_TAG {
        return Err(ObservationError::MissingTag(line.to_string()));
    }
    if parts.len() != FIELD_COUNT {
        return Err(ObservationError::FieldCount {
            expected: FIELD_COUNT,
            actual: parts.len(),
        });
    }

    let route_id: usize = parts[1]
        .trim()
        .parse()
        .map_err(|_| ObservationError::InvalidInteger {
            field: "route_id",
            value: parts[1].to_string(),
        })?;
    let status = RouteStatus::from_token(parts[2]).ok_or_else(|| ObservationError::UnknownStatus(parts[2].to_string()))?;
    let water_level = parse_reading("water_level", parts[3])?;
    let obstruction_level = parse_reading("obstruction_level", parts[4])?;

    let route = store
        .route_by_id(route_id)
        .ok_or(ObservationError::UnknownRoute(route_id))?;

    Ok(SensorObservation {
        route_id: Some(route_id),
        origin: route.origin,
        destination: route.destination,
        status,
        water_level,
        obstruction_level,
        observed_at,
    })
}

fn parse_reading(field: &'static str, raw: &str) -> Result<u16, ObservationError> {
    let value: i64 = raw.trim().parse().map_err(|_| ObservationError::InvalidInteger {
        field,
        value: raw.to_string(),
    })?;
    if !(0..=SENSOR_READING_MAX as i64).contains(&value) {
        return Err(ObservationError::ReadingOutOfRange { field, value });
    }
    Ok(value as u16)
}
