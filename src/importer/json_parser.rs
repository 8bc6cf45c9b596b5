// ==========================================
// 零件库 BOM 导入器 - JSON 解析器
// ==========================================
// 格式: 顶层为记录数组；元素是否为对象由字段校验阶段判定
// ==========================================

use crate::importer::bom_importer_trait::RecordParser;
use crate::importer::error::ImportError;
use crate::importer::record::{RecordValue, SourceRecord};
use serde_json::Value;

pub struct JsonRecordParser;

impl RecordParser for JsonRecordParser {
    fn parse(&self, data: &str) -> Result<Vec<SourceRecord>, ImportError> {
        let payload: Value = serde_json::from_str(data)?;

        let items = match payload {
            Value::Array(items) => items,
            other => return Err(ImportError::JsonNotArray(json_kind(&other).to_string())),
        };

        Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| SourceRecord {
                index,
                value: RecordValue::from_json(item),
            })
            .collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_of_records() {
        let records = JsonRecordParser
            .parse(r#"[{"quantity": 2.0, "part": {"id": 5}}, 3]"#)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert!(records[0].value.as_map().is_some());
        assert_eq!(records[1].value, RecordValue::Integer(3));
    }

    #[test]
    fn test_top_level_object_is_fatal() {
        let err = JsonRecordParser.parse(r#"{"quantity": 1.0}"#).unwrap_err();
        assert!(matches!(err, ImportError::JsonNotArray(kind) if kind == "object"));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = JsonRecordParser.parse("[{").unwrap_err();
        assert!(matches!(err, ImportError::JsonParseError(_)));
    }

    #[test]
    fn test_empty_array() {
        assert!(JsonRecordParser.parse("[]").unwrap().is_empty());
    }
}
