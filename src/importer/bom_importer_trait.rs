// ==========================================
// 零件库 BOM 导入器 - 导入接口 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 红线: 导入只读查找，不写入任何存储
// ==========================================

use crate::domain::{BomEntry, BomTarget, ImportReport, ImporterResult};
use crate::importer::error::ImportError;
use crate::importer::record::SourceRecord;
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// ImportOptions - 导入选项
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// 声明的导入类型（原样保留，无法识别时记录违规）
    pub import_type: String,
    /// 导入目标（项目或组件 BOM）
    pub target: BomTarget,
}

impl ImportOptions {
    pub fn new(import_type: impl Into<String>, target: BomTarget) -> Self {
        Self {
            import_type: import_type.into(),
            target,
        }
    }
}

// ==========================================
// BomImporter Trait
// ==========================================
// 用途: BOM 导入主接口
// 实现者: BomImporterImpl
pub trait BomImporter: Send + Sync {
    /// 从内存字符串导入
    ///
    /// # 返回
    /// - Ok(ImporterResult): 条目与违规（数据问题不产生 Err）
    /// - Err: 载荷不可解析、查找失败等致命错误
    fn import_string(
        &self,
        data: &str,
        options: &ImportOptions,
    ) -> Result<ImporterResult, ImportError>;

    /// 从文件导入（校验扩展名，附带批次信息）
    ///
    /// # 导入流程
    /// 1. 导入类型 / 扩展名校验
    /// 2. 读取文件内容
    /// 3. 解析 → 校验 → 实体解析 → 条目对账
    /// 4. 汇总批次统计
    fn import_file(
        &self,
        file_path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportError>;

    /// 兼容接口：遇到首条违规即以 Err 返回
    ///
    /// # 返回
    /// - Ok(Vec<BomEntry>): 无任何违规时的条目
    /// - Err(ImportError::Rejected): 首条违规
    fn string_to_bom_entries(
        &self,
        data: &str,
        options: &ImportOptions,
    ) -> Result<Vec<BomEntry>, ImportError> {
        let (entries, violations) = self.import_string(data, options)?.into_parts();
        match violations.into_iter().next() {
            Some(violation) => Err(ImportError::Rejected(Box::new(violation))),
            None => Ok(entries),
        }
    }
}

// ==========================================
// RecordParser Trait
// ==========================================
// 用途: 将载荷解析为标准化记录（阶段 1）
// 实现者: CsvRecordParser, JsonRecordParser
pub trait RecordParser: Send + Sync {
    /// 解析载荷
    ///
    /// # 返回
    /// - Ok(Vec<SourceRecord>): 记录及其输入位置
    /// - Err: 载荷整体不可解析
    fn parse(&self, data: &str) -> Result<Vec<SourceRecord>, ImportError>;
}

// ==========================================
// MessageTranslator Trait
// ==========================================
// 用途: 违规消息本地化
// 实现者: I18nTranslator
pub trait MessageTranslator: Send + Sync {
    /// 按模板键与参数生成消息
    ///
    /// # 说明
    /// - 参数以 `%{name}` 形式插值
    fn translate(&self, key: &str, params: &BTreeMap<String, String>) -> String;
}
