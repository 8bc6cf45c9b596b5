// ==========================================
// 零件库 BOM 导入器 - 导入器实现
// ==========================================
// 职责: 串联导入管道各阶段，产出 ImporterResult
// 流程: 类型/扩展名校验 → 解析 → 记录数上限 → 逐条 校验 → 解析实体 → 条目对账
// 红线:
// - 有违规的记录不产出条目
// - 记录级问题一律以违规返回，Err 仅用于致命错误
// - 条目顺序与输入记录顺序一致
// ==========================================

use crate::config::{config_keys, ImporterConfigReader};
use crate::domain::{
    BomTarget, ImportBatch, ImportReport, ImportType, ImporterResult, Violation,
};
use crate::importer::bom_importer_trait::{
    BomImporter, ImportOptions, MessageTranslator, RecordParser,
};
use crate::importer::bom_reconciler::BomReconciler;
use crate::importer::csv_parser::CsvRecordParser;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::ImportError;
use crate::importer::field_validator::FieldValidator;
use crate::importer::format_detector::{Detection, FormatDetector};
use crate::importer::json_parser::JsonRecordParser;
use crate::importer::kicad_parser::{KicadPcbParser, KicadRowError};
use crate::importer::record::SourceRecord;
use crate::importer::violation_builder::{entry_path, templates, ViolationBuilder};
use crate::repository::EntityLookup;
use chrono::Utc;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PipelineOutcome - 单次管道运行结果（含统计）
// ==========================================
struct PipelineOutcome {
    result: ImporterResult,
    total_records: usize,
    rejected_records: usize,
}

impl PipelineOutcome {
    /// 整体中止：结果仅含一条违规
    fn halted(violation: Violation, total_records: usize) -> Self {
        Self {
            result: ImporterResult::halted(violation),
            total_records,
            rejected_records: total_records,
        }
    }
}

// ==========================================
// BomImporterImpl - BOM 导入器实现
// ==========================================
pub struct BomImporterImpl<L, C, T>
where
    L: EntityLookup,
    C: ImporterConfigReader,
    T: MessageTranslator,
{
    // 实体查找（只读）
    lookup: L,

    // 配置读取器
    config: C,

    // 违规消息翻译器
    translator: T,

    // 解析器
    csv_parser: Box<dyn RecordParser>,
    json_parser: Box<dyn RecordParser>,
    kicad_parser: KicadPcbParser,
}

impl<L, C, T> BomImporterImpl<L, C, T>
where
    L: EntityLookup,
    C: ImporterConfigReader,
    T: MessageTranslator,
{
    /// 创建新的 BomImporter 实例
    ///
    /// # 参数
    /// - lookup: 实体查找
    /// - config: 配置读取器
    /// - translator: 违规消息翻译器
    pub fn new(lookup: L, config: C, translator: T) -> Self {
        Self {
            lookup,
            config,
            translator,
            csv_parser: Box::new(CsvRecordParser),
            json_parser: Box::new(JsonRecordParser),
            kicad_parser: KicadPcbParser,
        }
    }

    /// 按已确定的导入类型运行管道
    fn run_pipeline(
        &self,
        data: &str,
        import_type: ImportType,
        target: BomTarget,
        builder: &ViolationBuilder,
    ) -> Result<PipelineOutcome, ImportError> {
        debug!(import_type = %import_type, "步骤 1: 解析载荷");
        match import_type {
            ImportType::KicadPcbnew => self.import_kicad(data, target, builder),
            ImportType::Json => {
                let records = self.json_parser.parse(data)?;
                self.import_records(records, import_type, target, builder)
            }
            ImportType::Csv => {
                let records = self.csv_parser.parse(data)?;
                self.import_records(records, import_type, target, builder)
            }
        }
    }

    /// JSON / CSV 记录逐条处理
    fn import_records(
        &self,
        records: Vec<SourceRecord>,
        import_type: ImportType,
        target: BomTarget,
        builder: &ViolationBuilder,
    ) -> Result<PipelineOutcome, ImportError> {
        let total_records = records.len();
        info!(total_records, "载荷解析完成");

        if let Some(violation) = self.check_record_limit(total_records, builder)? {
            return Ok(PipelineOutcome::halted(violation, total_records));
        }

        let validator = FieldValidator::for_import_type(import_type);
        let resolver = EntityResolver::new(&self.lookup);
        let reconciler = BomReconciler::new(&self.lookup);

        let mut result = ImporterResult::new();
        let mut rejected_records = 0;

        for record in &records {
            let mut violations = Vec::new();

            // 步骤 2: 字段校验
            let validated = match validator.validate(record, builder, &mut violations) {
                Some(validated) => validated,
                None => {
                    rejected_records += 1;
                    debug!(index = record.index, violations = violations.len(), "字段校验未通过");
                    result.extend_violations(violations);
                    continue;
                }
            };

            // 步骤 3: 实体解析
            let base = entry_path(record.index);
            let resolved = match &validated.part {
                Some(candidates) => resolver.resolve(candidates, &base, builder, &mut violations)?,
                None => None,
            };

            if !violations.is_empty() {
                rejected_records += 1;
                debug!(index = record.index, violations = violations.len(), "实体解析未通过");
                result.extend_violations(violations);
                continue;
            }

            // 步骤 4: 条目对账
            let entry = reconciler.reconcile(validated, resolved, target)?;
            result.add_entry(entry);
        }

        Ok(PipelineOutcome {
            result,
            total_records,
            rejected_records,
        })
    }

    /// KiCad 行处理（任一行结构错误即整体中止）
    fn import_kicad(
        &self,
        data: &str,
        target: BomTarget,
        builder: &ViolationBuilder,
    ) -> Result<PipelineOutcome, ImportError> {
        let rows = match self.kicad_parser.parse(data)? {
            Ok(rows) => rows,
            Err(row_error) => {
                let violation = kicad_violation(&row_error, builder);
                warn!(violation = %violation, "KiCad BOM 结构错误，导入中止");
                let parsed = match row_error {
                    KicadRowError::FieldMissing { index, .. }
                    | KicadRowError::QuantityInvalid { index, .. } => index + 1,
                };
                return Ok(PipelineOutcome::halted(violation, parsed));
            }
        };

        let total_records = rows.len();
        info!(total_records, "KiCad BOM 解析完成");

        if let Some(violation) = self.check_record_limit(total_records, builder)? {
            return Ok(PipelineOutcome::halted(violation, total_records));
        }

        let reconciler = BomReconciler::new(&self.lookup);
        let mut result = ImporterResult::new();
        for row in &rows {
            result.add_entry(reconciler.reconcile_kicad(row, target)?);
        }

        Ok(PipelineOutcome {
            result,
            total_records,
            rejected_records: 0,
        })
    }

    /// 记录数上限检查
    fn check_record_limit(
        &self,
        count: usize,
        builder: &ViolationBuilder,
    ) -> Result<Option<Violation>, ImportError> {
        let max_records = self
            .config
            .get_max_records()
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::MAX_RECORDS.to_string(),
                message: e.to_string(),
            })?;

        match max_records {
            Some(max) if count > max => {
                warn!(count, max, "记录数超过上限，导入中止");
                Ok(Some(builder.build(
                    templates::TOO_MANY_RECORDS,
                    "file",
                    Value::from(count),
                    &[("count", count.to_string()), ("max", max.to_string())],
                )))
            }
            _ => Ok(None),
        }
    }
}

/// KiCad 行级错误 → 违规
fn kicad_violation(error: &KicadRowError, builder: &ViolationBuilder) -> Violation {
    match error {
        KicadRowError::FieldMissing { index, line, field } => builder.build(
            templates::KICAD_FIELD_MISSING,
            format!("{}.{}", entry_path(*index), field.to_lowercase()),
            Value::Null,
            &[("row", line.to_string()), ("field", field.to_string())],
        ),
        KicadRowError::QuantityInvalid { index, line, value } => builder.build(
            templates::KICAD_QUANTITY_INVALID,
            format!("{}.quantity", entry_path(*index)),
            Value::String(value.clone()),
            &[("row", line.to_string()), ("value", value.clone())],
        ),
    }
}

impl<L, C, T> BomImporter for BomImporterImpl<L, C, T>
where
    L: EntityLookup,
    C: ImporterConfigReader,
    T: MessageTranslator,
{
    #[instrument(skip(self, data, options), fields(import_type = %options.import_type, target = %options.target))]
    fn import_string(
        &self,
        data: &str,
        options: &ImportOptions,
    ) -> Result<ImporterResult, ImportError> {
        let builder = ViolationBuilder::new(&self.translator);
        let detector = FormatDetector::new(&self.config);

        let import_type = match detector.detect_type(&options.import_type, &builder) {
            Detection::Accepted(import_type) => import_type,
            Detection::Rejected(violation) => {
                warn!(violation = %violation, "导入类型无效");
                return Ok(ImporterResult::halted(violation));
            }
        };

        let outcome = self.run_pipeline(data, import_type, options.target, &builder)?;
        info!(
            entries = outcome.result.entries().len(),
            violations = outcome.result.violations().len(),
            "BOM 导入完成"
        );
        Ok(outcome.result)
    }

    #[instrument(skip(self, file_path, options), fields(batch_id = tracing::field::Empty, file = %file_path.display()))]
    fn import_file(
        &self,
        file_path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportError> {
        let start_time = Instant::now();
        let imported_at = Utc::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, target = %options.target, "开始导入 BOM 文件");

        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        let builder = ViolationBuilder::new(&self.translator);
        let detector = FormatDetector::new(&self.config);

        let detection = detector.detect_file(
            &options.import_type,
            file_name.as_deref().unwrap_or_default(),
            &builder,
        )?;
        let outcome = match detection {
            Detection::Accepted(import_type) => {
                let data = std::fs::read_to_string(file_path)?;
                self.run_pipeline(&data, import_type, options.target, &builder)?
            }
            Detection::Rejected(violation) => {
                warn!(violation = %violation, "导入类型或扩展名无效");
                PipelineOutcome::halted(violation, 0)
            }
        };

        let batch = ImportBatch {
            batch_id,
            file_name,
            import_type: ImportType::parse(&options.import_type),
            target: options.target,
            total_records: outcome.total_records,
            emitted_records: outcome.result.entries().len(),
            rejected_records: outcome.rejected_records,
            violation_count: outcome.result.violations().len(),
            imported_at,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            total_records = batch.total_records,
            emitted_records = batch.emitted_records,
            rejected_records = batch.rejected_records,
            violation_count = batch.violation_count,
            elapsed_ms = batch.elapsed_ms,
            "BOM 文件导入完成"
        );

        Ok(ImportReport {
            batch,
            result: outcome.result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImporterConfig;
    use crate::domain::Part;
    use crate::i18n::I18nTranslator;
    use crate::repository::InMemoryEntityStore;

    fn importer(
        config: ImporterConfig,
    ) -> BomImporterImpl<InMemoryEntityStore, ImporterConfig, I18nTranslator> {
        let store = InMemoryEntityStore::new().with_part(Part::new(5, "R1"));
        BomImporterImpl::new(store, config, I18nTranslator::default())
    }

    fn options(import_type: &str) -> ImportOptions {
        ImportOptions::new(import_type, BomTarget::Project(1))
    }

    #[test]
    fn test_invalid_type_halts_without_parsing() {
        let result = importer(ImporterConfig::default())
            .import_string("not even json", &options("xml"))
            .unwrap();

        assert!(result.entries().is_empty());
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].property_path(), "type");
    }

    #[test]
    fn test_record_limit() {
        let data = r#"[{"quantity": 1.0}, {"quantity": 2.0}, {"quantity": 3.0}]"#;
        let result = importer(ImporterConfig::default().with_max_records(2))
            .import_string(data, &options("json"))
            .unwrap();

        assert!(result.entries().is_empty());
        assert_eq!(result.violations().len(), 1);
        let violation = &result.violations()[0];
        assert_eq!(violation.property_path(), "file");
        assert_eq!(violation.message_template(), templates::TOO_MANY_RECORDS);
        assert_eq!(violation.parameters().get("count").unwrap(), "3");
    }

    #[test]
    fn test_record_limit_allows_exact_count() {
        let data = r#"[{"quantity": 1.0, "name": "A"}, {"quantity": 2.0, "name": "B"}]"#;
        let result = importer(ImporterConfig::default().with_max_records(2))
            .import_string(data, &options("json"))
            .unwrap();

        assert_eq!(result.entries().len(), 2);
    }

    #[test]
    fn test_violating_records_do_not_block_others() {
        let data = r#"[
            {"quantity": 1.0, "part": {"id": 5}},
            {"quantity": 0.0, "part": {"id": 5}},
            {"quantity": 2.0, "part": {"name": "R2"}}
        ]"#;
        let result = importer(ImporterConfig::default())
            .import_string(data, &options("json"))
            .unwrap();

        assert_eq!(result.entries().len(), 1);
        let paths: Vec<&str> = result.violations().iter().map(|v| v.property_path()).collect();
        assert_eq!(paths, vec!["entry[1].quantity", "entry[2].part"]);
    }

    #[test]
    fn test_kicad_violation_path() {
        let result = importer(ImporterConfig::default())
            .import_string("Id;Designator;Package;Quantity\n1;R1;0805;2\n", &options("kicad_pcbnew"))
            .unwrap();

        assert!(result.entries().is_empty());
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].property_path(), "entry[0].designation");
        assert_eq!(result.violations()[0].parameters().get("row").unwrap(), "2");
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = importer(ImporterConfig::default())
            .import_string("{", &options("json"))
            .unwrap_err();

        assert!(matches!(err, ImportError::JsonParseError(_)));
    }
}
