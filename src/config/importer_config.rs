// ==========================================
// 零件库 BOM 导入器 - 内存导入配置
// ==========================================
// 职责: ImporterConfigReader 的默认实现（可由 JSON 反序列化）
// ==========================================

use crate::config::import_config_trait::ImporterConfigReader;
use crate::domain::ImportType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub locale: String,
    pub max_records: Option<usize>,
    /// 扩展名白名单覆写（未列出的类型使用默认值）
    pub allowed_extensions: HashMap<ImportType, Vec<String>>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            max_records: None,
            allowed_extensions: HashMap::new(),
        }
    }
}

impl ImporterConfig {
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn with_allowed_extensions(mut self, import_type: ImportType, extensions: &[&str]) -> Self {
        self.allowed_extensions.insert(
            import_type,
            extensions.iter().map(|e| e.to_lowercase()).collect(),
        );
        self
    }
}

/// 默认扩展名白名单（owned）
pub fn default_extensions(import_type: ImportType) -> Vec<String> {
    import_type
        .default_extensions()
        .iter()
        .map(|e| e.to_string())
        .collect()
}

impl ImporterConfigReader for ImporterConfig {
    fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.locale.clone())
    }

    fn get_max_records(&self) -> Result<Option<usize>, Box<dyn Error>> {
        Ok(self.max_records)
    }

    fn get_allowed_extensions(
        &self,
        import_type: ImportType,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self
            .allowed_extensions
            .get(&import_type)
            .cloned()
            .unwrap_or_else(|| default_extensions(import_type)))
    }
}
