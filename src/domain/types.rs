// ==========================================
// 零件库 BOM 导入器 - 领域类型定义
// ==========================================
// 职责: 导入类型 / BOM 归属目标 / 查找键
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入类型 (Import Type)
// ==========================================
// 由调用方显式声明，不做内容嗅探
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    KicadPcbnew, // KiCad Pcbnew BOM 导出（分号分隔、按位置映射）
    Json,        // JSON 记录数组
    Csv,         // 通用 CSV（表头驱动、下划线嵌套）
}

impl ImportType {
    /// 全部导入类型（按声明顺序）
    pub const ALL: [ImportType; 3] = [ImportType::KicadPcbnew, ImportType::Json, ImportType::Csv];

    /// 解析导入选项中的 `type` 字段
    ///
    /// # 返回
    /// - Some(ImportType): 可识别的类型
    /// - None: 未知类型（由调用方记录 invalid_import_type 违规）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "kicad_pcbnew" => Some(ImportType::KicadPcbnew),
            "json" => Some(ImportType::Json),
            "csv" => Some(ImportType::Csv),
            _ => None,
        }
    }

    /// 选项值（与 `parse` 互逆）
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::KicadPcbnew => "kicad_pcbnew",
            ImportType::Json => "json",
            ImportType::Csv => "csv",
        }
    }

    /// 默认允许的文件扩展名
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            ImportType::KicadPcbnew => &["kicad_pcb"],
            ImportType::Json => &["json"],
            ImportType::Csv => &["csv"],
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// BOM 归属目标 (BOM Target)
// ==========================================
// 项目 BOM 与组件 BOM 共用一套导入逻辑，仅查找范围不同
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BomTarget {
    Project(i64),
    Assembly(i64),
}

impl BomTarget {
    pub fn id(&self) -> i64 {
        match self {
            BomTarget::Project(id) | BomTarget::Assembly(id) => *id,
        }
    }

    /// 目标类别名（用于存储层与消息参数）
    pub fn kind(&self) -> &'static str {
        match self {
            BomTarget::Project(_) => "project",
            BomTarget::Assembly(_) => "assembly",
        }
    }

    /// 解析 `project:12` / `assembly:3` 形式
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, id) = value.trim().split_once(':')?;
        let id = id.trim().parse::<i64>().ok().filter(|id| *id > 0)?;
        match kind.trim().to_lowercase().as_str() {
            "project" => Some(BomTarget::Project(id)),
            "assembly" => Some(BomTarget::Assembly(id)),
            _ => None,
        }
    }
}

impl fmt::Display for BomTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

// ==========================================
// 零件查找键 (Part Key)
// ==========================================
// 查找顺序: id → mpnr → ipn → name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartKey {
    Id(i64),
    Mpnr(String), // 制造商产品编号
    Ipn(String),  // 内部零件编号
    Name(String),
}

impl PartKey {
    /// 键名（与导入字段同名）
    pub fn field(&self) -> &'static str {
        match self {
            PartKey::Id(_) => "id",
            PartKey::Mpnr(_) => "mpnr",
            PartKey::Ipn(_) => "ipn",
            PartKey::Name(_) => "name",
        }
    }
}

// ==========================================
// 制造商/分类查找键 (Named Key)
// ==========================================
// 查找顺序: id → name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Id(i64),
    Name(String),
}
