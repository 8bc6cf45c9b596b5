// ==========================================
// 零件库 BOM 导入器 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: BOM 导入与实体对账（不负责持久化提交）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 实体查找
pub mod repository;

// 导入层 - BOM 导入管道
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BomEntry, BomTarget, Category, ImportBatch, ImportReport, ImportType, ImporterResult,
    Manufacturer, Part, Violation,
};

// 导入器
pub use importer::{BomImporter, BomImporterImpl, ImportError, ImportOptions};

// 仓储
pub use repository::{EntityLookup, InMemoryEntityStore, SqliteEntityLookup};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "零件库 BOM 导入器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
