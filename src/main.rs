// ==========================================
// 零件库 BOM 导入器 - 命令行入口
// ==========================================
// 用法: bom-import <file> <kicad_pcbnew|json|csv> <project|assembly>:<id> [db_path]
// 输出: 导入报告 JSON（stdout）；日志与摘要（stderr）
// 退出码: 0 无违规 / 1 存在违规 / 2 参数错误
// ==========================================

use anyhow::{anyhow, Context, Result};
use bom_importer::config::{ConfigManager, ImporterConfigReader};
use bom_importer::db::{get_default_db_path, open_sqlite_connection};
use bom_importer::i18n::{self, t, t_with_args, I18nTranslator};
use bom_importer::repository::init_schema;
use bom_importer::{logging, BomImporter, BomImporterImpl, BomTarget, ImportOptions, SqliteEntityLookup};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

fn main() -> Result<()> {
    // 初始化日志系统
    logging::init_from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("{}", t("cli.usage"));
        std::process::exit(2);
    }

    let file_path = Path::new(&args[0]);
    let import_type = args[1].as_str();
    let target = match BomTarget::parse(&args[2]) {
        Some(target) => target,
        None => {
            eprintln!("{}", t_with_args("cli.invalid_target", &[("target", args[2].as_str())]));
            std::process::exit(2);
        }
    };
    if !file_path.exists() {
        eprintln!(
            "{}",
            t_with_args("cli.file_not_found", &[("path", file_path.display().to_string().as_str())])
        );
        std::process::exit(2);
    }

    info!("==================================================");
    info!("{} v{}", bom_importer::APP_NAME, bom_importer::VERSION);
    info!("==================================================");

    // 获取数据库路径
    let db_path = args.get(3).cloned().unwrap_or_else(get_default_db_path);
    info!(db_path = %db_path, "使用数据库");

    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据库目录: {}", parent.display()))?;
        }
    }
    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("初始化数据库 schema 失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone()).map_err(|e| anyhow!(e.to_string()))?;
    let locale = config.get_locale().map_err(|e| anyhow!(e.to_string()))?;
    i18n::set_locale(&locale);

    let lookup = SqliteEntityLookup::from_connection(conn)?;
    let importer = BomImporterImpl::new(lookup, config, I18nTranslator::new(locale));

    let report = importer.import_file(file_path, &ImportOptions::new(import_type, target))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!(
        "{}",
        t_with_args(
            "cli.summary",
            &[
                ("emitted", report.batch.emitted_records.to_string().as_str()),
                ("total", report.batch.total_records.to_string().as_str()),
                ("violations", report.batch.violation_count.to_string().as_str()),
            ],
        )
    );

    if report.result.has_violations() {
        std::process::exit(1);
    }
    Ok(())
}
