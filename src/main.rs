// ==========================================
// 灾害救援物流系统 - 命令行入口
// ==========================================
// 用法:
//   relief-logistics init <data_dir> [db_path]
//   relief-logistics sensor <line> [db_path]
//   relief-logistics simulate <n> [db_path]
//   relief-logistics plan [db_path]
// ==========================================

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use relief_logistics::app::get_default_db_path;
use relief_logistics::api::ApiError;
use relief_logistics::engine::{MonitorRecord, SensorSimulator};
use relief_logistics::{logging, LogisticsApi};

// 模拟监测两条读数之间的间隔
const SIMULATE_INTERVAL: Duration = Duration::from_secs(1);

fn usage() -> String {
    [
        "用法:",
        "  relief-logistics init <data_dir> [db_path]",
        "  relief-logistics sensor <line> [db_path]",
        "  relief-logistics simulate <n> [db_path]",
        "  relief-logistics plan [db_path]",
    ]
    .join("\n")
}

fn open_api(db_path: Option<&String>) -> Result<LogisticsApi> {
    let db_path = db_path.cloned().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    LogisticsApi::open(&db_path).with_context(|| format!("无法打开数据库 {}", db_path))
}

fn run_plan(api: &LogisticsApi) -> Result<()> {
    let run = api.allocate().context("生成配送方案失败")?;
    println!("方案版本: {}", run.version_id);
    print!("{}", api.plan_summary(&run.plan));
    Ok(())
}

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(usage());
    };

    tracing::info!("{} v{}", relief_logistics::APP_NAME, relief_logistics::VERSION);

    match command.as_str() {
        "init" => {
            let data_dir = args.get(1).with_context(usage)?;
            let mut api = open_api(args.get(2))?;
            api.import_dataset(Path::new(data_dir))
                .with_context(|| format!("导入数据集失败: {}", data_dir))?;
            println!(
                "已导入: {} 个区域, {} 个中心, {} 条路段",
                api.store().areas().len(),
                api.store().centers().len(),
                api.store().routes().len()
            );
        }
        "sensor" => {
            let line = args.get(1).with_context(usage)?;
            let mut api = open_api(args.get(2))?;
            let outcome = api.ingest_sensor_line(line)?;
            let t = &outcome.transition;
            println!("路段 {}: {} → {} ({})", t.pair, t.previous, t.current, t.action);
            if outcome.replan_recommended {
                println!("路段阻断,重新生成配送方案");
                run_plan(&api)?;
            }
        }
        "simulate" => {
            let count: usize = args
                .get(1)
                .with_context(usage)?
                .parse()
                .context("观测条数必须是非负整数")?;
            let mut api = open_api(args.get(2))?;
            let mut simulator = SensorSimulator::from_os_rng();
            match api.simulate_sensors(&mut simulator, count, SIMULATE_INTERVAL) {
                Ok(records) => print_records(&records),
                Err(ApiError::SimulationInterrupted { records, source }) => {
                    print_records(&records);
                    bail!("最后一条观测未能落库: {}", source);
                }
                Err(e) => return Err(e.into()),
            }
        }
        "plan" => {
            let api = open_api(args.get(1))?;
            run_plan(&api)?;
        }
        other => bail!("未知命令: {}\n{}", other, usage()),
    }

    Ok(())
}

fn print_records(records: &[MonitorRecord]) {
    for record in records {
        let line = record.observation.to_line().unwrap_or_default();
        match &record.result {
            Ok(t) => println!("{} => {} ({})", line, t.current, t.action),
            Err(e) => println!("{} => 拒绝: {}", line, e),
        }
    }
}
