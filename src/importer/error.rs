// ==========================================
// 零件库 BOM 导入器 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 数据问题以 Violation 返回；此处仅为无法继续的致命错误
// ==========================================

use crate::domain::Violation;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 解析错误 =====
    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("JSON 解析失败: {0}")]
    JsonParseError(String),

    #[error("JSON 顶层必须是记录数组，实际为 {0}")]
    JsonNotArray(String),

    // ===== 查找错误 =====
    #[error("实体查找失败: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 兼容接口 =====
    #[error("导入被拒绝: {0}")]
    Rejected(Box<Violation>),
}

impl ImportError {
    /// 兼容接口中的首条违规
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ImportError::Rejected(violation) => Some(violation),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
