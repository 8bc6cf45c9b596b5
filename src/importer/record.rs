// ==========================================
// 零件库 BOM 导入器 - 标准化导入记录
// ==========================================
// 职责: 各格式统一为 字段名 → 标量/嵌套映射 的记录树
// 说明: CSV 列名按下划线拆分为路径自顶向下逐层建树，不依赖别名引用
// ==========================================

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

// ==========================================
// RecordValue - 记录字段值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<RecordValue>),
    Map(ImportRecord),
    /// CSV 数字单元格：数字值 + 单元格原文（"007" / "1.10" 作为文本使用时不失真）
    Numeric {
        number: Box<RecordValue>,
        raw: String,
    },
}

impl RecordValue {
    /// CSV 单元格标量化：数字形态 → 含 '.' 为浮点、否则整数（保留原文）；其余保持字符串
    pub fn from_csv_cell(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() {
            return RecordValue::Null;
        }
        if !looks_numeric(value) {
            return RecordValue::String(value.to_string());
        }

        match Self::parse_number(value) {
            RecordValue::String(text) => RecordValue::String(text),
            number => RecordValue::Numeric {
                number: Box::new(number),
                raw: value.to_string(),
            },
        }
    }

    fn parse_number(value: &str) -> Self {
        match value.parse::<f64>() {
            Ok(number) if value.contains('.') => RecordValue::Float(number),
            Ok(number) => match value.parse::<i64>() {
                Ok(integer) => RecordValue::Integer(integer),
                // 指数形式（如 1e3）取整
                Err(_) if number.fract() == 0.0 && number.abs() < i64::MAX as f64 => {
                    RecordValue::Integer(number as i64)
                }
                Err(_) => RecordValue::Float(number),
            },
            Err(_) => RecordValue::String(value.to_string()),
        }
    }

    /// serde_json 值 → 记录值（对象递归转换，字段名原样保留）
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => RecordValue::Null,
            Value::Bool(b) => RecordValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) if !n.is_f64() => RecordValue::Integer(i),
                _ => n
                    .as_f64()
                    .map(RecordValue::Float)
                    .unwrap_or(RecordValue::Null),
            },
            Value::String(s) => RecordValue::String(s),
            Value::Array(items) => {
                RecordValue::List(items.into_iter().map(RecordValue::from_json).collect())
            }
            Value::Object(map) => {
                let mut record = ImportRecord::new();
                for (key, value) in map {
                    record.insert(key, RecordValue::from_json(value));
                }
                RecordValue::Map(record)
            }
        }
    }

    /// 记录值 → serde_json 值（用于违规记录中的原始值）
    pub fn to_json(&self) -> Value {
        match self {
            RecordValue::Null => Value::Null,
            RecordValue::Bool(b) => Value::Bool(*b),
            RecordValue::Integer(i) => Value::Number(Number::from(*i)),
            RecordValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            RecordValue::String(s) => Value::String(s.clone()),
            RecordValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            RecordValue::Map(record) => record.to_json(),
            RecordValue::Numeric { number, .. } => number.to_json(),
        }
    }

    /// 去掉 CSV 原文包装后的标量
    pub fn scalar(&self) -> &RecordValue {
        match self {
            RecordValue::Numeric { number, .. } => number,
            other => other,
        }
    }

    /// 单元格原文（仅 CSV 数字单元格）
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            RecordValue::Numeric { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RecordValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RecordValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ImportRecord> {
        match self {
            RecordValue::Map(record) => Some(record),
            _ => None,
        }
    }

    /// 整数值（浮点不视为整数）
    pub fn as_integer(&self) -> Option<i64> {
        match self.scalar() {
            RecordValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// 任意数字值
    pub fn as_number(&self) -> Option<f64> {
        match self.scalar() {
            RecordValue::Integer(i) => Some(*i as f64),
            RecordValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// 面向用户的展示形式（字符串不加引号）
    pub fn display(&self) -> String {
        match self {
            RecordValue::String(s) => s.clone(),
            RecordValue::Integer(i) => i.to_string(),
            RecordValue::Float(f) => f.to_string(),
            RecordValue::Numeric { raw, .. } => raw.clone(),
            other => other.to_json().to_string(),
        }
    }

    /// 是否为“空”值（剪枝用）
    fn is_empty_leaf(&self) -> bool {
        match self {
            RecordValue::Null => true,
            RecordValue::String(s) => s.is_empty(),
            RecordValue::List(items) => items.is_empty(),
            RecordValue::Map(record) => record.is_empty(),
            _ => false,
        }
    }
}

/// 数字形态判断（不接受 inf/NaN 等字面量）
fn looks_numeric(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && value.parse::<f64>().is_ok_and(|n| n.is_finite())
}

// ==========================================
// ImportRecord - 导入记录（映射节点）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRecord {
    fields: BTreeMap<String, RecordValue>,
}

impl ImportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RecordValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key)
    }

    /// 取非 null 字段（null 视同缺失）
    pub fn get_present(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// 按点分路径取值，如 "part.manufacturer.name"
    pub fn get_path(&self, path: &str) -> Option<&RecordValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_map()?.fields.get(segment)?;
        }
        Some(current)
    }

    /// 沿路径插入值，逐层创建映射节点
    ///
    /// # 说明
    /// - 中间节点若已是标量，会被映射节点替换（后出现的列优先）
    pub fn insert_path(&mut self, segments: &[&str], value: RecordValue) {
        match segments {
            [] => {}
            [leaf] => self.insert(*leaf, value),
            [head, rest @ ..] => {
                let node = self
                    .fields
                    .entry(head.to_string())
                    .or_insert_with(|| RecordValue::Map(ImportRecord::new()));
                if !matches!(node, RecordValue::Map(_)) {
                    *node = RecordValue::Map(ImportRecord::new());
                }
                if let RecordValue::Map(child) = node {
                    child.insert_path(rest, value);
                }
            }
        }
    }

    /// 递归剪除空叶子与空子映射
    pub fn prune_empty(self) -> Self {
        let fields = self
            .fields
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    RecordValue::Map(child) => RecordValue::Map(child.prune_empty()),
                    other => other,
                };
                (!value.is_empty_leaf()).then_some((key, value))
            })
            .collect();
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

// ==========================================
// SourceRecord - 带输入位置的记录
// ==========================================
// index: 从 0 开始的行号/数组下标，用于违规路径
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub index: usize,
    pub value: RecordValue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_cell_coercion() {
        assert_eq!(RecordValue::from_csv_cell("2").scalar(), &RecordValue::Integer(2));
        assert_eq!(RecordValue::from_csv_cell(" 2.5 ").scalar(), &RecordValue::Float(2.5));
        assert_eq!(RecordValue::from_csv_cell("1e3").scalar(), &RecordValue::Integer(1000));
        assert_eq!(RecordValue::from_csv_cell("-4").scalar(), &RecordValue::Integer(-4));
        assert_eq!(
            RecordValue::from_csv_cell("10k"),
            RecordValue::String("10k".to_string())
        );
        assert_eq!(
            RecordValue::from_csv_cell("inf"),
            RecordValue::String("inf".to_string())
        );
        assert_eq!(RecordValue::from_csv_cell("   "), RecordValue::Null);
    }

    #[test]
    fn test_csv_numeric_cell_keeps_raw_text() {
        let ipn = RecordValue::from_csv_cell(" 007 ");
        let mpnr = RecordValue::from_csv_cell("1.10");

        assert_eq!(ipn.as_integer(), Some(7));
        assert_eq!(ipn.raw_text(), Some("007"));
        assert_eq!(ipn.display(), "007");
        assert_eq!(ipn.to_json(), json!(7));
        assert_eq!(mpnr.as_number(), Some(1.1));
        assert_eq!(mpnr.raw_text(), Some("1.10"));
        assert_eq!(RecordValue::from_csv_cell("R1").raw_text(), None);
    }

    #[test]
    fn test_insert_path_builds_nested_tree() {
        let mut record = ImportRecord::new();
        record.insert_path(&["part", "manufacturer", "name"], RecordValue::String("Yageo".into()));
        record.insert_path(&["part", "id"], RecordValue::Integer(5));
        record.insert_path(&["quantity"], RecordValue::Float(2.0));

        assert_eq!(
            record.to_json(),
            json!({"part": {"id": 5, "manufacturer": {"name": "Yageo"}}, "quantity": 2.0})
        );
        assert_eq!(
            record.get_path("part.manufacturer.name").and_then(|v| v.as_str()),
            Some("Yageo")
        );
        assert!(record.get_path("part.category.name").is_none());
    }

    #[test]
    fn test_insert_path_replaces_scalar_parent() {
        let mut record = ImportRecord::new();
        record.insert_path(&["part"], RecordValue::String("R1".into()));
        record.insert_path(&["part", "name"], RecordValue::String("R1".into()));

        assert_eq!(record.to_json(), json!({"part": {"name": "R1"}}));
    }

    #[test]
    fn test_prune_empty_recursively() {
        let mut record = ImportRecord::new();
        record.insert_path(&["name"], RecordValue::Null);
        record.insert_path(&["part", "manufacturer", "name"], RecordValue::String(String::new()));
        record.insert_path(&["part", "category", "id"], RecordValue::Null);
        record.insert_path(&["quantity"], RecordValue::Integer(0));

        let pruned = record.prune_empty();

        // 0 不是空值
        assert_eq!(pruned.to_json(), json!({"quantity": 0}));
    }

    #[test]
    fn test_from_json_keeps_number_kinds() {
        let value = RecordValue::from_json(json!({"a": 2, "b": 2.0, "c": null}));
        let record = value.as_map().unwrap();

        assert_eq!(record.get("a"), Some(&RecordValue::Integer(2)));
        assert_eq!(record.get("b"), Some(&RecordValue::Float(2.0)));
        assert!(record.get("c").is_some());
        assert!(record.get_present("c").is_none());
    }
}
