// ==========================================
// 灾害救援物流系统 - 数据集 CSV 解析
// ==========================================
// 输入: 数据生成器输出的三张 CSV 表
// - areas_afetadas_classificadas.csv（缺失时回退 areas_afetadas.csv）
// - rotas.csv
// - centros_distribuicao.csv
// 说明: 多余列忽略; nivel_criticidade 为空或未知标签视为未分级
// ==========================================

use crate::domain::{Area, Center, Criticality, ResourceBundle, Route, RouteStatus};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::EntityStore;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

pub const CLASSIFIED_AREAS_FILE: &str = "areas_afetadas_classificadas.csv";
pub const AREAS_FILE: &str = "areas_afetadas.csv";
pub const ROUTES_FILE: &str = "rotas.csv";
pub const CENTERS_FILE: &str = "centros_distribuicao.csv";

// ==========================================
// CSV 行记录
// ==========================================

#[derive(Debug, Deserialize)]
struct AreaRecord {
    id: u32,
    #[serde(default)]
    nome: Option<String>,
    latitude: f64,
    longitude: f64,
    pessoas_afetadas: u32,
    necessidade_agua: u32,
    necessidade_alimentos: u32,
    necessidade_medicamentos: u32,
    #[serde(default)]
    nivel_criticidade: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteRecord {
    origem: u32,
    destino: u32,
    #[serde(default)]
    distancia_km: Option<f64>,
    tempo_percurso_min: f64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct CenterRecord {
    id: u32,
    #[serde(default)]
    nome: Option<String>,
    latitude: f64,
    longitude: f64,
    estoque_agua: u32,
    estoque_alimentos: u32,
    estoque_medicamentos: u32,
    capacidade_veiculos: u32,
}

// ==========================================
// 读取
// ==========================================

/// 读取 CSV 并反序列化为行记录
fn read_records<T: DeserializeOwned>(path: &Path) -> ImportResult<Vec<T>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(file);

    let mut records = Vec::new();
    for (row_idx, result) in reader.deserialize().enumerate() {
        let record: T = result.map_err(|e| ImportError::CsvParseError {
            file: path.display().to_string(),
            message: format!("行 {}: {}", row_idx + 1, e),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// 读取区域表
pub fn load_areas(path: &Path) -> ImportResult<Vec<Area>> {
    let records: Vec<AreaRecord> = read_records(path)?;
    Ok(records
        .into_iter()
        .map(|r| {
            let criticality = r.nivel_criticidade.as_deref().and_then(|label| {
                let tier = Criticality::parse_label(label);
                if tier.is_none() && !label.trim().is_empty() {
                    warn!(area_id = r.id, label, "未知严重等级标签,按未分级处理");
                }
                tier
            });
            Area {
                id: r.id,
                name: r.nome.unwrap_or_else(|| format!("Área {}", r.id)),
                latitude: r.latitude,
                longitude: r.longitude,
                population: r.pessoas_afetadas,
                need: ResourceBundle::new(r.necessidade_agua, r.necessidade_alimentos, r.necessidade_medicamentos),
                criticality,
            }
        })
        .collect())
}

/// 读取路段表（状态标记必须是 livre|parcial|bloqueada）
pub fn load_routes(path: &Path) -> ImportResult<Vec<Route>> {
    let records: Vec<RouteRecord> = read_records(path)?;
    records
        .into_iter()
        .enumerate()
        .map(|(row_idx, r)| {
            let status = RouteStatus::from_token(&r.status).ok_or_else(|| ImportError::FieldValueError {
                file: path.display().to_string(),
                row: row_idx + 1,
                field: "status".to_string(),
                value: r.status.clone(),
            })?;
            Ok(Route {
                origin: r.origem,
                destination: r.destino,
                distance_km: r.distancia_km.unwrap_or(0.0),
                base_time_min: r.tempo_percurso_min,
                status,
            })
        })
        .collect()
}

/// 读取中心表
pub fn load_centers(path: &Path) -> ImportResult<Vec<Center>> {
    let records: Vec<CenterRecord> = read_records(path)?;
    Ok(records
        .into_iter()
        .map(|r| Center {
            id: r.id,
            name: r.nome.unwrap_or_else(|| format!("Centro {}", r.id)),
            latitude: r.latitude,
            longitude: r.longitude,
            stock: ResourceBundle::new(r.estoque_agua, r.estoque_alimentos, r.estoque_medicamentos),
            vehicles: r.capacidade_veiculos,
        })
        .collect())
}

/// 从目录读取完整数据集
pub fn load_dataset(dir: &Path) -> ImportResult<EntityStore> {
    let areas_path = if dir.join(CLASSIFIED_AREAS_FILE).exists() {
        dir.join(CLASSIFIED_AREAS_FILE)
    } else {
        dir.join(AREAS_FILE)
    };

    let areas = load_areas(&areas_path)?;
    let routes = load_routes(&dir.join(ROUTES_FILE))?;
    let centers = load_centers(&dir.join(CENTERS_FILE))?;

    info!(
        areas = areas.len(),
        routes = routes.len(),
        centers = centers.len(),
        dir = %dir.display(),
        "数据集已读取"
    );

    EntityStore::new(areas, centers, routes).map_err(|e| ImportError::ValidationError(e.to_string()))
}
