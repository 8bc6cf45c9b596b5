// ==========================================
// 零件库 BOM 导入器 - 配置层
// ==========================================
// 职责: 导入配置读取（内存默认值 / config_kv 表）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod importer_config;

// 重导出
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImporterConfigReader;
pub use importer_config::ImporterConfig;
