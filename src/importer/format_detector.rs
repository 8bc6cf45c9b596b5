// ==========================================
// 零件库 BOM 导入器 - 导入类型与扩展名校验
// ==========================================
// 职责: 声明的导入类型 → ImportType；文件扩展名是否被允许
// 说明: 不做内容嗅探，类型只取调用方声明
// ==========================================

use crate::config::config_manager::config_keys;
use crate::config::ImporterConfigReader;
use crate::domain::{ImportType, Violation};
use crate::importer::error::ImportError;
use crate::importer::violation_builder::{templates, ViolationBuilder};
use serde_json::Value;
use std::path::Path;

// ==========================================
// Detection - 校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Accepted(ImportType),
    Rejected(Violation), // 整体中止，结果仅含此违规
}

pub struct FormatDetector<'a> {
    config: &'a dyn ImporterConfigReader,
}

impl<'a> FormatDetector<'a> {
    pub fn new(config: &'a dyn ImporterConfigReader) -> Self {
        Self { config }
    }

    /// 校验声明的导入类型
    pub fn detect_type(&self, declared_type: &str, builder: &ViolationBuilder) -> Detection {
        match ImportType::parse(declared_type) {
            Some(import_type) => Detection::Accepted(import_type),
            None => {
                let allowed = ImportType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Detection::Rejected(builder.build(
                    templates::INVALID_IMPORT_TYPE,
                    "type",
                    Value::String(declared_type.to_string()),
                    &[
                        ("type", declared_type.to_string()),
                        ("allowed_types", allowed),
                    ],
                ))
            }
        }
    }

    /// 校验导入类型与文件扩展名
    ///
    /// # 返回
    /// - Ok(Detection): 接受或单条违规
    /// - Err: 配置读取失败
    pub fn detect_file(
        &self,
        declared_type: &str,
        file_name: &str,
        builder: &ViolationBuilder,
    ) -> Result<Detection, ImportError> {
        let import_type = match self.detect_type(declared_type, builder) {
            Detection::Accepted(import_type) => import_type,
            rejected => return Ok(rejected),
        };

        let extension = file_extension(file_name);
        let allowed = self
            .config
            .get_allowed_extensions(import_type)
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::allowed_extensions(import_type),
                message: e.to_string(),
            })?;

        if allowed.iter().any(|ext| *ext == extension) {
            return Ok(Detection::Accepted(import_type));
        }

        Ok(Detection::Rejected(builder.build(
            templates::INVALID_FILE_EXTENSION,
            "file.extension",
            Value::String(extension.clone()),
            &[
                ("extension", extension),
                ("import_type", import_type.as_str().to_string()),
                ("allowed_extensions", allowed.join(", ")),
            ],
        )))
    }
}

/// 小写扩展名（无扩展名时为空串）
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImporterConfig;
    use crate::i18n::I18nTranslator;

    #[test]
    fn test_detect_type_accepts_known_types() {
        let config = ImporterConfig::default();
        let translator = I18nTranslator::default();
        let builder = ViolationBuilder::new(&translator);
        let detector = FormatDetector::new(&config);

        assert_eq!(
            detector.detect_type("kicad_pcbnew", &builder),
            Detection::Accepted(ImportType::KicadPcbnew)
        );
        assert_eq!(
            detector.detect_type("csv", &builder),
            Detection::Accepted(ImportType::Csv)
        );
    }

    #[test]
    fn test_detect_type_rejects_unknown_type() {
        let config = ImporterConfig::default();
        let translator = I18nTranslator::default();
        let builder = ViolationBuilder::new(&translator);
        let detector = FormatDetector::new(&config);

        match detector.detect_type("xlsx", &builder) {
            Detection::Rejected(violation) => {
                assert_eq!(violation.property_path(), "type");
                assert_eq!(violation.message_template(), templates::INVALID_IMPORT_TYPE);
                assert!(violation.message().contains("kicad_pcbnew, json, csv"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_detect_file_checks_extension() {
        let config = ImporterConfig::default();
        let translator = I18nTranslator::default();
        let builder = ViolationBuilder::new(&translator);
        let detector = FormatDetector::new(&config);

        assert_eq!(
            detector.detect_file("json", "bom.JSON", &builder).unwrap(),
            Detection::Accepted(ImportType::Json)
        );

        match detector.detect_file("json", "bom.csv", &builder).unwrap() {
            Detection::Rejected(violation) => {
                assert_eq!(violation.property_path(), "file.extension");
                assert_eq!(violation.parameters().get("extension").unwrap(), "csv");
                assert_eq!(violation.parameters().get("allowed_extensions").unwrap(), "json");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_detect_file_uses_configured_extensions() {
        let config =
            ImporterConfig::default().with_allowed_extensions(ImportType::Csv, &["csv", "txt"]);
        let translator = I18nTranslator::default();
        let builder = ViolationBuilder::new(&translator);
        let detector = FormatDetector::new(&config);

        assert_eq!(
            detector.detect_file("csv", "bom.txt", &builder).unwrap(),
            Detection::Accepted(ImportType::Csv)
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("board.kicad_pcb"), "kicad_pcb");
        assert_eq!(file_extension("/tmp/BOM.Csv"), "csv");
        assert_eq!(file_extension("README"), "");
    }
}
