// ==========================================
// 零件库 BOM 导入器 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入结果
// 红线: 不含数据访问逻辑，不含导入管道逻辑
// ==========================================

pub mod bom;
pub mod import_result;
pub mod part;
pub mod types;

// 重导出核心类型
pub use bom::BomEntry;
pub use import_result::{ImportBatch, ImportReport, ImporterResult, Violation};
pub use part::{Category, Manufacturer, Part};
pub use types::{BomTarget, ImportType, NamedKey, PartKey};
