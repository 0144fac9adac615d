// ==========================================
// API层集成端到端测试
// ==========================================
// 目标: 验证 导入 → 观测 → 分配 → 落库 的完整链路
// 简化版本：只使用API层，不涉及内部实现细节
// ==========================================


#[cfg(test)]
mod api_integration_e2e_test {
    use crate::test_helpers::{create_test_db, sample_store, write_dataset};
    use relief_logistics::api::{ApiError, LogisticsApi};
    use relief_logistics::config::{config_keys, ConfigError};
    use relief_logistics::domain::{NodeId, RouteStatus};
    use relief_logistics::engine::{EdgeAction, ObservationError, SensorSimulator};
    use relief_logistics::importer::{PLAN_CSV_FILE, PLAN_JSON_FILE};
    use relief_logistics::logging;
    use std::time::Duration;
    use tempfile::{NamedTempFile, TempDir};

    /// 创建完整测试环境: 临时数据库 + 已导入的样例数据集
    fn setup() -> (NamedTempFile, String, LogisticsApi) {
        logging::init_test();
        let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
        let data_dir = TempDir::new().unwrap();
        write_dataset(data_dir.path(), &sample_store()).unwrap();

        let mut api = LogisticsApi::open(&db_path).expect("Failed to open api");
        api.import_dataset(data_dir.path()).expect("Failed to import dataset");
        (temp_file, db_path, api)
    }

    #[test]
    fn test_import_is_persisted() {
        let (_temp_file, db_path, api) = setup();
        assert_eq!(api.store(), &sample_store());

        let reopened = LogisticsApi::open(&db_path).unwrap();
        assert_eq!(reopened.store(), api.store());
        assert_eq!(reopened.graph().edge_count(), api.graph().edge_count());
    }

    #[test]
    fn test_blocking_sensor_line_recommends_replan_and_persists() {
        let (_temp_file, db_path, mut api) = setup();

        let outcome = api.ingest_sensor_line("DADOS_SENSOR:4:bloqueada:3900:4000").unwrap();
        assert!(outcome.replan_recommended);
        assert_eq!(outcome.transition.action, EdgeAction::Removed);
        assert_eq!(outcome.transition.route_id, Some(4));
        assert!(!api.graph().has_route(NodeId::Area(5), NodeId::Area(7)));

        let reopened = LogisticsApi::open(&db_path).unwrap();
        assert_eq!(reopened.store().routes()[4].status, RouteStatus::Blocked);
        assert!(!reopened.graph().has_route(NodeId::Area(5), NodeId::Area(7)));

        let outcome = api.ingest_sensor_line("DADOS_SENSOR:4:livre:100:0").unwrap();
        assert!(!outcome.replan_recommended);
        assert_eq!(outcome.transition.action, EdgeAction::Reinserted);
        assert_eq!(api.graph().weight(NodeId::Area(5), NodeId::Area(7)), Some(12.0));
    }

    #[test]
    fn test_malformed_line_changes_nothing() {
        let (_temp_file, db_path, mut api) = setup();
        let before = api.store().clone();

        for line in [
            "DADOS_SENSOR:4:bloqueada:3900",
            "DADOS_SENSOR:4:bloqueada:3900:9999",
            "DADOS_SENSOR:42:livre:1:1",
            "SENSOR:4:livre:1:1",
        ] {
            let err = api.ingest_sensor_line(line).unwrap_err();
            assert!(matches!(err, ApiError::MalformedObservation(_)), "{}: {:?}", line, err);
        }
        assert!(matches!(
            api.ingest_sensor_line("DADOS_SENSOR:42:livre:1:1"),
            Err(ApiError::MalformedObservation(ObservationError::UnknownRoute(42)))
        ));

        assert_eq!(api.store(), &before);
        assert_eq!(LogisticsApi::open(&db_path).unwrap().store(), &before);
    }

    #[test]
    fn test_allocate_persists_plan_without_consuming_stock() {
        let (_temp_file, _db_path, api) = setup();

        let run = api.allocate().unwrap();
        assert_eq!(run.plan.len(), 5);
        assert_eq!(api.store().centers(), sample_store().centers());

        let latest = api.latest_plan().unwrap().expect("plan should be saved");
        assert_eq!(latest.version_id, run.version_id);
        assert_eq!(latest.plan.outcomes(), run.plan.outcomes());

        // 相同输入再次分配得到相同方案,版本不同
        let again = api.allocate().unwrap();
        assert_eq!(again.plan, run.plan);
        assert_ne!(again.version_id, run.version_id);
    }

    #[test]
    fn test_plan_summary_respects_limit() {
        let (_temp_file, _db_path, mut api) = setup();
        let run = api.allocate().unwrap();

        let summary = api.plan_summary(&run.plan);
        assert!(summary.contains("配送 1:"));
        assert!(summary.contains("中心: C1 → 区域: A4 (HIGH)"));
        assert!(summary.contains("路径: C1->A3->A4"));
        assert!(summary.contains("未分配: A7"));
        assert!(!summary.contains("省略"));

        api.update_config(config_keys::SUMMARY_LIMIT, "2").unwrap();
        let summary = api.plan_summary(&run.plan);
        assert!(summary.contains("配送 2:"));
        assert!(!summary.contains("配送 3:"));
        assert!(summary.contains("其余 3 条省略"));
    }

    #[test]
    fn test_update_config_rebuilds_network() {
        let (_temp_file, db_path, mut api) = setup();
        assert!(!api.graph().has_route(NodeId::Center(1), NodeId::Area(7)));

        api.update_config(config_keys::CONNECTOR_AREA_COUNT, "7").unwrap();
        assert!(api.graph().has_route(NodeId::Center(1), NodeId::Area(7)));
        assert_eq!(LogisticsApi::open(&db_path).unwrap().config().network.connector_area_count, 7);

        let err = api.update_config(config_keys::CONNECTOR_AREA_COUNT, "many").unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(ConfigError::InvalidValue { .. })));
        assert_eq!(api.config().network.connector_area_count, 7);
        assert_eq!(LogisticsApi::open(&db_path).unwrap().config().network.connector_area_count, 7);
    }

    #[test]
    fn test_negative_connector_weight_factor_is_rolled_back() {
        let (_temp_file, db_path, mut api) = setup();
        let before = api.graph().shortest_path(NodeId::Center(1), NodeId::Area(1)).unwrap();

        let err = api
            .update_config(config_keys::CONNECTOR_WEIGHT_FACTOR, "-2")
            .unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(ConfigError::InvalidValue { .. })));

        let after = api.graph().shortest_path(NodeId::Center(1), NodeId::Area(1)).unwrap();
        assert_eq!(after, before);
        assert!(after.total_weight >= 0.0);
        assert_eq!(
            LogisticsApi::open(&db_path).unwrap().config().network.connector_weight_factor,
            api.config().network.connector_weight_factor
        );
    }

    #[test]
    fn test_simulated_monitoring_is_persisted() {
        let (_temp_file, db_path, mut api) = setup();
        let mut simulator = SensorSimulator::with_seed(2024);

        let records = api.simulate_sensors(&mut simulator, 30, Duration::ZERO).unwrap();
        assert_eq!(records.len(), 30);
        assert!(records.iter().all(|r| r.result.is_ok()));

        let reopened = LogisticsApi::open(&db_path).unwrap();
        assert_eq!(reopened.store(), api.store());
    }

    #[test]
    fn test_simulation_stops_at_first_failed_write_and_returns_records() {
        let (_temp_file, _db_path, mut api) = setup();
        // 清空库中路段表,使任何状态变化都无法回写
        api.connection().lock().unwrap().execute("DELETE FROM route", []).unwrap();

        let mut simulator = SensorSimulator::with_seed(2024);
        let err = api.simulate_sensors(&mut simulator, 30, Duration::ZERO).unwrap_err();
        let (records, source) = match err {
            ApiError::SimulationInterrupted { records, source } => (records, source),
            other => panic!("unexpected error: {:?}", other),
        };
        assert!(matches!(*source, ApiError::NotFound(_)));

        let (last, persisted) = records.split_last().expect("at least one record");
        assert!(persisted
            .iter()
            .all(|r| matches!(&r.result, Ok(t) if t.action == EdgeAction::Unchanged)));
        let transition = last.result.as_ref().unwrap();
        assert_ne!(transition.action, EdgeAction::Unchanged);
        let route_id = transition.route_id.unwrap();
        assert_eq!(api.store().routes()[route_id].status, transition.current);
    }

    #[test]
    fn test_exports_are_written() {
        let (_temp_file, _db_path, mut api) = setup();
        let out = TempDir::new().unwrap();

        api.ingest_sensor_line("DADOS_SENSOR:0:parcial:10:10").unwrap();
        let run = api.allocate().unwrap();
        api.export_plan(&run.plan, out.path()).unwrap();
        api.export_routes(&out.path().join("rotas.csv")).unwrap();

        assert!(out.path().join(PLAN_CSV_FILE).exists());
        assert!(out.path().join(PLAN_JSON_FILE).exists());
        let routes = std::fs::read_to_string(out.path().join("rotas.csv")).unwrap();
        assert!(routes.lines().nth(1).unwrap().ends_with(",parcial"));
    }
}
