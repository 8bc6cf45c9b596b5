// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::importer::bom_importer_trait::MessageTranslator;
use std::collections::BTreeMap;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 已提供消息目录的语言
pub fn available_locales() -> Vec<&'static str> {
    rust_i18n::available_locales!()
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use bom_importer::i18n::t;
/// let msg = t("bom_importer.quantity.required");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use bom_importer::i18n::t_with_args;
/// let msg = t_with_args("cli.file_not_found", &[("path", "/tmp/bom.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        result = result.replace(&format!("%{{{}}}", k), v);
    }
    result
}

/// 替换 `%{name}` 占位符
fn interpolate(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut result = template.to_string();
    for (k, v) in params {
        result = result.replace(&format!("%{{{}}}", k), v);
    }
    result
}

// ==========================================
// I18nTranslator - 违规消息翻译器
// ==========================================
// 绑定固定语言，不受全局 locale 切换影响
#[derive(Debug, Clone)]
pub struct I18nTranslator {
    locale: String,
}

impl I18nTranslator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Default for I18nTranslator {
    fn default() -> Self {
        Self::new("en")
    }
}

impl MessageTranslator for I18nTranslator {
    fn translate(&self, key: &str, params: &BTreeMap<String, String>) -> String {
        let template = rust_i18n::t!(key, locale = self.locale.as_str()).to_string();
        interpolate(&template, params)
    }
}
