// ==========================================
// 灾害救援物流系统 - 数据导入导出层
// ==========================================
// 职责: 读取协作方提供的 CSV 数据集,导出路段表与配送方案
// ==========================================

pub mod error;
pub mod exporter;
pub mod file_parser;

pub use error::{ImportError, ImportResult};
pub use exporter::{export_plan_csv, export_plan_json, export_routes_csv, PLAN_CSV_FILE, PLAN_JSON_FILE};
pub use file_parser::{
    load_areas, load_centers, load_dataset, load_routes, AREAS_FILE, CENTERS_FILE, CLASSIFIED_AREAS_FILE,
    ROUTES_FILE,
};
