// ==========================================
// 零件库 BOM 导入器 - 违规构造器
// ==========================================
// 职责: 模板键 + 属性路径 + 原始值 + 参数 → 本地化 Violation
// 说明: 参数 `property` 默认取属性路径
// ==========================================

use crate::domain::Violation;
use crate::importer::bom_importer_trait::MessageTranslator;
use serde_json::Value;
use std::collections::BTreeMap;

/// 稳定的消息模板键
pub mod templates {
    pub const INVALID_IMPORT_TYPE: &str = "bom_importer.invalid_import_type";
    pub const INVALID_FILE_EXTENSION: &str = "bom_importer.invalid_file_extension";
    pub const TOO_MANY_RECORDS: &str = "bom_importer.too_many_records";
    pub const ENTRY_OBJECT_REQUIRED: &str = "bom_importer.entry.object_required";
    pub const ENTRY_NAME_OR_PART_REQUIRED: &str = "bom_importer.entry.name_or_part_required";
    pub const QUANTITY_REQUIRED: &str = "bom_importer.quantity.required";
    pub const QUANTITY_FLOAT: &str = "bom_importer.quantity.float";
    pub const QUANTITY_NUMERIC: &str = "bom_importer.quantity.numeric";
    pub const STRING: &str = "bom_importer.parameter.string";
    pub const STRING_NOT_EMPTY: &str = "bom_importer.parameter.string_not_empty";
    pub const OBJECT: &str = "bom_importer.parameter.object";
    pub const SUBFIELD_REQUIRED: &str = "bom_importer.parameter.subfield_required";
    pub const NOT_FOUND_FOR: &str = "bom_importer.parameter.not_found_for";
    pub const NO_EXACT_MATCH: &str = "bom_importer.parameter.no_exact_match";
    pub const KICAD_FIELD_MISSING: &str = "bom_importer.kicad.field_missing";
    pub const KICAD_QUANTITY_INVALID: &str = "bom_importer.kicad.quantity_invalid";
}

/// 记录的属性路径前缀，如 `entry[3]`
pub fn entry_path(index: usize) -> String {
    format!("entry[{}]", index)
}

// ==========================================
// ViolationBuilder
// ==========================================
pub struct ViolationBuilder<'a> {
    translator: &'a dyn MessageTranslator,
}

impl<'a> ViolationBuilder<'a> {
    pub fn new(translator: &'a dyn MessageTranslator) -> Self {
        Self { translator }
    }

    /// 构造违规
    ///
    /// # 参数
    /// - template: 模板键（见 `templates`）
    /// - property_path: 属性路径
    /// - invalid_value: 违规原始值
    /// - params: 额外插值参数
    pub fn build(
        &self,
        template: &str,
        property_path: impl Into<String>,
        invalid_value: Value,
        params: &[(&str, String)],
    ) -> Violation {
        let property_path = property_path.into();
        let mut parameters: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        parameters
            .entry("property".to_string())
            .or_insert_with(|| property_path.clone());

        let message = self.translator.translate(template, &parameters);
        Violation::new(message, template, property_path, invalid_value, parameters)
    }

    /// 实体类别的本地化名称（part / manufacturer / category）
    pub fn entity_label(&self, entity: &str) -> String {
        self.translator
            .translate(&format!("bom_importer.entity.{}", entity), &BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::I18nTranslator;
    use serde_json::json;

    #[test]
    fn test_build_fills_property_parameter() {
        let translator = I18nTranslator::new("en");
        let builder = ViolationBuilder::new(&translator);

        let violation = builder.build(
            templates::QUANTITY_REQUIRED,
            "entry[2].quantity",
            Value::Null,
            &[],
        );

        assert_eq!(violation.message_template(), templates::QUANTITY_REQUIRED);
        assert_eq!(violation.property_path(), "entry[2].quantity");
        assert_eq!(
            violation.parameters().get("property").map(String::as_str),
            Some("entry[2].quantity")
        );
        assert_eq!(violation.message(), "The field entry[2].quantity is required.");
    }

    #[test]
    fn test_build_keeps_explicit_parameters() {
        let translator = I18nTranslator::new("en");
        let builder = ViolationBuilder::new(&translator);

        let violation = builder.build(
            templates::INVALID_IMPORT_TYPE,
            "type",
            json!("xlsx"),
            &[
                ("type", "xlsx".to_string()),
                ("allowed_types", "kicad_pcbnew, json, csv".to_string()),
            ],
        );

        assert!(violation.message().contains("xlsx"));
        assert!(violation.message().contains("kicad_pcbnew, json, csv"));
        assert_eq!(violation.invalid_value(), &json!("xlsx"));
    }

    #[test]
    fn test_entity_label_is_localized() {
        let en = I18nTranslator::new("en");
        let zh = I18nTranslator::new("zh-CN");

        assert_eq!(ViolationBuilder::new(&en).entity_label("part"), "part");
        assert_eq!(ViolationBuilder::new(&zh).entity_label("part"), "零件");
    }

    #[test]
    fn test_entry_path() {
        assert_eq!(entry_path(0), "entry[0]");
        assert_eq!(entry_path(12), "entry[12]");
    }
}
