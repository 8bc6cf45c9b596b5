// ==========================================
// 零件库 BOM 导入器 - 导入层
// ==========================================
// 职责: KiCad / JSON / CSV 载荷 → BOM 条目 + 违规
// 流程: 格式校验 → 解析 → 字段校验 → 实体解析 → 条目对账
// ==========================================

// 模块声明
pub mod bom_importer_impl;
pub mod bom_importer_trait;
pub mod bom_reconciler;
pub mod csv_parser;
pub mod entity_resolver;
pub mod error;
pub mod field_validator;
pub mod format_detector;
pub mod json_parser;
pub mod kicad_parser;
pub mod lookup_chain;
pub mod record;
pub mod violation_builder;

// 重导出核心类型
pub use bom_importer_impl::BomImporterImpl;
pub use csv_parser::CsvRecordParser;
pub use error::{ImportError, ImportResult};
pub use json_parser::JsonRecordParser;
pub use kicad_parser::{KicadPcbParser, KicadRow};
pub use record::{ImportRecord, RecordValue, SourceRecord};
pub use violation_builder::templates;

// 重导出 Trait 接口
pub use bom_importer_trait::{BomImporter, ImportOptions, MessageTranslator, RecordParser};
