// ==========================================
// 零件库 BOM 导入器 - 导入结果与违规记录
// ==========================================
// 职责: ImporterResult（条目 + 违规）/ Violation / 批次信息
// 红线: 有违规的记录不得产出条目（条目与违规按记录互斥）
// ==========================================

use crate::domain::bom::BomEntry;
use crate::domain::types::{BomTarget, ImportType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Violation - 违规记录
// ==========================================
// 构造后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    message: String,                       // 已本地化的消息
    message_template: String,              // 稳定的消息模板键
    property_path: String,                 // 如 entry[3].part.manufacturer.name
    invalid_value: serde_json::Value,      // 违规原始值
    parameters: BTreeMap<String, String>,  // 消息插值参数
}

impl Violation {
    pub fn new(
        message: impl Into<String>,
        message_template: impl Into<String>,
        property_path: impl Into<String>,
        invalid_value: serde_json::Value,
        parameters: BTreeMap<String, String>,
    ) -> Self {
        Self {
            message: message.into(),
            message_template: message_template.into(),
            property_path: property_path.into(),
            invalid_value,
            parameters,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    pub fn property_path(&self) -> &str {
        &self.property_path
    }

    pub fn invalid_value(&self) -> &serde_json::Value {
        &self.invalid_value
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.property_path, self.message)
    }
}

// ==========================================
// ImporterResult - 导入结果
// ==========================================
// 每次导入调用创建一次，由管道写入，返回给调用方
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImporterResult {
    entries: Vec<BomEntry>,
    violations: Vec<Violation>,
}

impl ImporterResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅含单条违规的结果（结构性错误时整体中止）
    pub fn halted(violation: Violation) -> Self {
        Self {
            entries: Vec::new(),
            violations: vec![violation],
        }
    }

    pub fn add_entry(&mut self, entry: BomEntry) {
        self.entries.push(entry);
    }


    pub fn extend_violations(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    pub fn entries(&self) -> &[BomEntry] {
        &self.entries
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn into_parts(self) -> (Vec<BomEntry>, Vec<Violation>) {
        (self.entries, self.violations)
    }
}

// ==========================================
// ImportBatch - 导入批次信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                  // 批次 ID（UUID）
    pub file_name: Option<String>,         // 源文件名
    pub import_type: Option<ImportType>,   // 声明的导入类型（无法识别时为 None）
    pub target: BomTarget,                 // 导入目标
    pub total_records: usize,              // 解析得到的记录数
    pub emitted_records: usize,            // 产出条目的记录数
    pub rejected_records: usize,           // 被拒绝的记录数
    pub violation_count: usize,            // 违规总数
    pub imported_at: DateTime<Utc>,        // 导入时间
    pub elapsed_ms: u64,                   // 导入耗时（毫秒）
}

// ==========================================
// ImportReport - 文件导入报告
// ==========================================
// 用途: 文件级导入接口返回值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch: ImportBatch,      // 批次信息
    pub result: ImporterResult,  // 条目与违规明细
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(path: &str) -> Violation {
        Violation::new(
            "Quantity is required",
            "bom_importer.quantity.required",
            path,
            serde_json::Value::Null,
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_halted_result_has_single_violation() {
        let result = ImporterResult::halted(violation("type"));

        assert!(result.entries().is_empty());
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].property_path(), "type");
    }

    #[test]
    fn test_violation_serializes_fields() {
        let v = violation("entry[0].quantity");
        let value = serde_json::to_value(&v).unwrap();

        assert_eq!(value["property_path"], json!("entry[0].quantity"));
        assert_eq!(value["message_template"], json!("bom_importer.quantity.required"));
        assert_eq!(v.to_string(), "entry[0].quantity: Quantity is required");
    }
}
