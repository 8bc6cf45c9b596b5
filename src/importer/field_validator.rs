// ==========================================
// 零件库 BOM 导入器 - 字段校验（阶段 2）
// ==========================================
// 职责: 逐条记录检查字段形态，产出带类型的候选键
// 规则:
// - quantity 必填且 > 0（JSON 须为浮点；CSV 接受任意数字）
// - name / mountnames / comment 若出现须为字符串
// - part 若出现须为对象，且 id/mpnr/ipn/name 至少一个有效
// - part.description 若出现须为非空字符串
// - part.manufacturer / part.category 若出现须为对象，且 id/name 至少一个有效
// 说明: 一条记录的全部检查都会执行，违规逐项累计
// ==========================================

use crate::domain::{ImportType, NamedKey, PartKey, Violation};
use crate::importer::record::{ImportRecord, RecordValue, SourceRecord};
use crate::importer::violation_builder::{entry_path, templates, ViolationBuilder};
use serde_json::Value;

// ==========================================
// Candidate - 单个候选键
// ==========================================
// raw: 导入值原样（用于消息）；valid: 通过类型检查后的值
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    raw: Option<RecordValue>,
    valid: Option<T>,
}

impl<T> Candidate<T> {
    pub fn value(&self) -> Option<&T> {
        self.valid.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid.is_some()
    }

    pub fn raw(&self) -> Option<&RecordValue> {
        self.raw.as_ref()
    }

    /// 摘要中的展示值（未提供时为 "-"）
    pub fn display(&self) -> String {
        self.raw
            .as_ref()
            .map(RecordValue::display)
            .unwrap_or_else(|| "-".to_string())
    }
}

fn id_candidate(record: &ImportRecord, key: &str) -> Candidate<i64> {
    let raw = record.get_present(key).cloned();
    let valid = raw
        .as_ref()
        .and_then(RecordValue::as_integer)
        .filter(|id| *id > 0);
    Candidate { raw, valid }
}

fn text_candidate(record: &ImportRecord, key: &str, strict: bool) -> Candidate<String> {
    let raw = record.get_present(key).cloned();
    let valid = raw
        .as_ref()
        .and_then(|value| as_text(value, strict))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    Candidate { raw, valid }
}

/// 文本值；非严格模式下数字按原样文本接受（CSV 数字化后的列）
fn as_text(value: &RecordValue, strict: bool) -> Option<String> {
    match value {
        RecordValue::String(s) => Some(s.clone()),
        RecordValue::Numeric { raw, .. } if !strict => Some(raw.clone()),
        RecordValue::Integer(_) | RecordValue::Float(_) if !strict => Some(value.display()),
        _ => None,
    }
}

// ==========================================
// PartKeys - 零件候选键集合
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PartKeys {
    pub id: Candidate<i64>,
    pub mpnr: Candidate<String>,
    pub ipn: Candidate<String>,
    pub name: Candidate<String>,
}

impl PartKeys {
    /// 有效键，按查找顺序 id → mpnr → ipn → name
    pub fn lookup_keys(&self) -> Vec<PartKey> {
        let mut keys = Vec::new();
        if let Some(id) = self.id.value() {
            keys.push(PartKey::Id(*id));
        }
        if let Some(mpnr) = self.mpnr.value() {
            keys.push(PartKey::Mpnr(mpnr.clone()));
        }
        if let Some(ipn) = self.ipn.value() {
            keys.push(PartKey::Ipn(ipn.clone()));
        }
        if let Some(name) = self.name.value() {
            keys.push(PartKey::Name(name.clone()));
        }
        keys
    }

    pub fn has_valid_key(&self) -> bool {
        self.id.is_valid() || self.mpnr.is_valid() || self.ipn.is_valid() || self.name.is_valid()
    }

    /// 各键导入值摘要，如 `part.id: 5, part.mpnr: -, part.ipn: -, part.name: R2`
    pub fn summary(&self) -> String {
        format!(
            "part.id: {}, part.mpnr: {}, part.ipn: {}, part.name: {}",
            self.id.display(),
            self.mpnr.display(),
            self.ipn.display(),
            self.name.display()
        )
    }
}

// ==========================================
// NamedKeys - 制造商/分类候选键
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NamedKeys {
    pub id: Candidate<i64>,
    pub name: Candidate<String>,
    pub raw: Value,
}

impl NamedKeys {
    /// 有效键，按查找顺序 id → name
    pub fn lookup_keys(&self) -> Vec<NamedKey> {
        let mut keys = Vec::new();
        if let Some(id) = self.id.value() {
            keys.push(NamedKey::Id(*id));
        }
        if let Some(name) = self.name.value() {
            keys.push(NamedKey::Name(name.clone()));
        }
        keys
    }

    pub fn has_valid_key(&self) -> bool {
        self.id.is_valid() || self.name.is_valid()
    }

    pub fn summary(&self, entity: &str) -> String {
        format!(
            "{entity}.id: {}, {entity}.name: {}",
            self.id.display(),
            self.name.display()
        )
    }
}

// ==========================================
// PartCandidates - 记录中的 part 子对象
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PartCandidates {
    pub keys: PartKeys,
    pub description: Option<String>,
    pub manufacturer: Option<NamedKeys>,
    pub category: Option<NamedKeys>,
    pub raw: Value,
}

/// 名称字段的三种形态
#[derive(Debug, Clone, PartialEq)]
pub enum NameField {
    Absent,
    Blank,         // 空白串：清除名称覆写
    Given(String), // 已去除首尾空白
}

// ==========================================
// ValidatedRecord - 通过字段校验的记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub index: usize,
    pub quantity: f64,
    pub name: NameField,
    pub mountnames: Option<String>,
    pub comment: Option<String>,
    pub part: Option<PartCandidates>,
}

// ==========================================
// FieldValidator
// ==========================================
pub struct FieldValidator {
    // JSON: 数量须为浮点、文本须为字符串；CSV: 数字列可作文本
    strict_types: bool,
}

impl FieldValidator {
    pub fn for_import_type(import_type: ImportType) -> Self {
        Self {
            strict_types: import_type != ImportType::Csv,
        }
    }

    /// 校验单条记录
    ///
    /// # 返回
    /// - Some(ValidatedRecord): 该记录无任何违规
    /// - None: 记录被拒绝（违规已追加到 violations）
    pub fn validate(
        &self,
        record: &SourceRecord,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Option<ValidatedRecord> {
        let base = entry_path(record.index);
        let fields = match record.value.as_map() {
            Some(fields) => fields,
            None => {
                violations.push(builder.build(
                    templates::ENTRY_OBJECT_REQUIRED,
                    base,
                    record.value.to_json(),
                    &[],
                ));
                return None;
            }
        };

        let before = violations.len();
        let quantity = self.check_quantity(fields, &base, builder, violations);
        let name = self.check_name(fields, &base, builder, violations);
        let mountnames = self.check_optional_text(fields, "mountnames", &base, builder, violations);
        let comment = self.check_optional_text(fields, "comment", &base, builder, violations);
        let part = fields
            .get_present("part")
            .and_then(|value| self.check_part(value, &base, builder, violations));

        if violations.len() > before {
            return None;
        }

        // 无零件关联的条目须有名称
        if fields.get_present("part").is_none() && !matches!(name, NameField::Given(_)) {
            violations.push(builder.build(
                templates::ENTRY_NAME_OR_PART_REQUIRED,
                base,
                record.value.to_json(),
                &[],
            ));
            return None;
        }

        Some(ValidatedRecord {
            index: record.index,
            quantity: quantity?,
            name,
            mountnames,
            comment,
            part,
        })
    }

    fn check_quantity(
        &self,
        fields: &ImportRecord,
        base: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Option<f64> {
        let path = format!("{}.quantity", base);
        let value = match fields.get_present("quantity") {
            Some(value) => value,
            None => {
                violations.push(builder.build(templates::QUANTITY_REQUIRED, path, Value::Null, &[]));
                return None;
            }
        };

        let number = match value.scalar() {
            RecordValue::Float(q) => Some(*q),
            RecordValue::Integer(q) if !self.strict_types => Some(*q as f64),
            _ => None,
        };
        let quantity = number.filter(|q| q.is_finite() && *q > 0.0);

        if quantity.is_none() {
            let template = if self.strict_types {
                templates::QUANTITY_FLOAT
            } else {
                templates::QUANTITY_NUMERIC
            };
            violations.push(builder.build(template, path, value.to_json(), &[]));
        }
        quantity
    }

    fn check_name(
        &self,
        fields: &ImportRecord,
        base: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> NameField {
        let value = match fields.get_present("name") {
            Some(value) => value,
            None => return NameField::Absent,
        };

        match as_text(value, self.strict_types) {
            Some(text) if text.trim().is_empty() => NameField::Blank,
            Some(text) => NameField::Given(text.trim().to_string()),
            None => {
                violations.push(builder.build(
                    templates::STRING,
                    format!("{}.name", base),
                    value.to_json(),
                    &[],
                ));
                NameField::Absent
            }
        }
    }

    fn check_optional_text(
        &self,
        fields: &ImportRecord,
        key: &str,
        base: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Option<String> {
        let value = fields.get_present(key)?;
        let text = as_text(value, self.strict_types);
        if text.is_none() {
            violations.push(builder.build(
                templates::STRING,
                format!("{}.{}", base, key),
                value.to_json(),
                &[],
            ));
        }
        text.map(|t| t.trim().to_string())
    }

    fn check_part(
        &self,
        value: &RecordValue,
        base: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Option<PartCandidates> {
        let path = format!("{}.part", base);
        let part = match value.as_map() {
            Some(part) => part,
            None => {
                violations.push(builder.build(templates::OBJECT, path, value.to_json(), &[]));
                return None;
            }
        };

        let keys = PartKeys {
            id: id_candidate(part, "id"),
            mpnr: text_candidate(part, "mpnr", self.strict_types),
            ipn: text_candidate(part, "ipn", self.strict_types),
            name: text_candidate(part, "name", self.strict_types),
        };
        if !keys.has_valid_key() {
            violations.push(builder.build(
                templates::SUBFIELD_REQUIRED,
                path.as_str(),
                part.to_json(),
                &[("required_fields", "id, mpnr, ipn, name".to_string())],
            ));
        }

        let description = part.get_present("description").and_then(|raw| {
            let text = as_text(raw, self.strict_types)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            if text.is_none() {
                violations.push(builder.build(
                    templates::STRING_NOT_EMPTY,
                    format!("{}.description", path),
                    raw.to_json(),
                    &[],
                ));
            }
            text
        });

        let manufacturer = self.check_named(part, "manufacturer", &path, builder, violations);
        let category = self.check_named(part, "category", &path, builder, violations);

        Some(PartCandidates {
            keys,
            description,
            manufacturer,
            category,
            raw: part.to_json(),
        })
    }

    fn check_named(
        &self,
        part: &ImportRecord,
        key: &str,
        part_path: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Option<NamedKeys> {
        let value = part.get_present(key)?;
        let path = format!("{}.{}", part_path, key);
        let fields = match value.as_map() {
            Some(fields) => fields,
            None => {
                violations.push(builder.build(templates::OBJECT, path, value.to_json(), &[]));
                return None;
            }
        };

        let keys = NamedKeys {
            id: id_candidate(fields, "id"),
            name: text_candidate(fields, "name", self.strict_types),
            raw: fields.to_json(),
        };
        if !keys.has_valid_key() {
            violations.push(builder.build(
                templates::SUBFIELD_REQUIRED,
                path,
                fields.to_json(),
                &[("required_fields", "id, name".to_string())],
            ));
        }
        Some(keys)
    }
}
