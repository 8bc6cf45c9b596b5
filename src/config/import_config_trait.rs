// ==========================================
// 零件库 BOM 导入器 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::ImportType;
use std::error::Error;

// ==========================================
// ImporterConfigReader Trait
// ==========================================
// 实现者: ImporterConfig（内存默认值）, ConfigManager（config_kv 表）
pub trait ImporterConfigReader: Send + Sync {
    /// 获取违规消息语言
    ///
    /// # 默认值
    /// - "en"
    fn get_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 获取单次导入的记录数上限
    ///
    /// # 返回
    /// - Some(n): 超过 n 条记录时整体拒绝
    /// - None: 不限制
    ///
    /// # 默认值
    /// - None
    fn get_max_records(&self) -> Result<Option<usize>, Box<dyn Error>>;

    /// 获取导入类型允许的文件扩展名（小写，不含点）
    ///
    /// # 默认值
    /// - kicad_pcbnew → [kicad_pcb]
    /// - json → [json]
    /// - csv → [csv]
    fn get_allowed_extensions(
        &self,
        import_type: ImportType,
    ) -> Result<Vec<String>, Box<dyn Error>>;
}
