// ==========================================
// 灾害救援物流系统 - CSV / JSON 导出
// ==========================================
// 说明: 文件整体覆盖写,无原子替换
// ==========================================

use crate::domain::Plan;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::EntityStore;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub const PLAN_CSV_FILE: &str = "plano_logistico.csv";
pub const PLAN_JSON_FILE: &str = "plano_logistico.json";

const UNCLASSIFIED_LABEL: &str = "não classificada";

#[derive(Debug, Serialize)]
struct RouteRow {
    origem: u32,
    destino: u32,
    distancia_km: f64,
    tempo_percurso_min: f64,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct PlanRow {
    centro_origem: String,
    area_destino: String,
    criticidade: &'static str,
    pessoas_atendidas: u32,
    agua: u32,
    alimentos: u32,
    medicamentos: u32,
    tempo_estimado_min: f64,
    rota: String,
}

/// 以当前状态重写路段表
pub fn export_routes_csv(store: &EntityStore, path: &Path) -> ImportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for route in store.routes() {
        writer.serialize(RouteRow {
            origem: route.origin,
            destino: route.destination,
            distancia_km: route.distance_km,
            tempo_percurso_min: route.base_time_min,
            status: route.status.token(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// 导出配送方案 CSV（路径以 "->" 连接）
pub fn export_plan_csv(plan: &Plan, path: &Path) -> ImportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for d in plan.deliveries() {
        writer.serialize(PlanRow {
            centro_origem: format!("C{}", d.center_id),
            area_destino: format!("A{}", d.area_id),
            criticidade: d.criticality.map(|c| c.dataset_label()).unwrap_or(UNCLASSIFIED_LABEL),
            pessoas_atendidas: d.population_served,
            agua: d.shipped.water,
            alimentos: d.shipped.food,
            medicamentos: d.shipped.medicine,
            tempo_estimado_min: d.travel_time_min,
            rota: d.path_label(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// 导出配送方案 JSON
pub fn export_plan_json(plan: &Plan, path: &Path) -> ImportResult<()> {
    let file = File::create(path).map_err(ImportError::Io)?;
    serde_json::to_writer_pretty(BufWriter::new(file), plan)?;
    Ok(())
}
