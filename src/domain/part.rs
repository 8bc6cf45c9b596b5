// ==========================================
// 零件库 BOM 导入器 - 零件/制造商/分类实体
// ==========================================
// 职责: 导入时查找得到的领域记录
// 说明: 实体由外部存储提供，导入器只在内存中合并字段，不负责写回
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Manufacturer - 制造商
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
}

// ==========================================
// Category - 零件分类
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

// ==========================================
// Part - 零件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub manufacturer_product_number: Option<String>, // mpnr
    pub ipn: Option<String>,                         // 内部零件编号
    pub manufacturer: Option<Manufacturer>,
    pub category: Option<Category>,
}

impl Part {
    /// 创建仅含 id/名称的零件（其余字段为空）
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            manufacturer_product_number: None,
            ipn: None,
            manufacturer: None,
            category: None,
        }
    }

    pub fn with_mpnr(mut self, mpnr: impl Into<String>) -> Self {
        self.manufacturer_product_number = Some(mpnr.into());
        self
    }

    pub fn with_ipn(mut self, ipn: impl Into<String>) -> Self {
        self.ipn = Some(ipn.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: Manufacturer) -> Self {
        self.manufacturer = Some(manufacturer);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn manufacturer_id(&self) -> Option<i64> {
        self.manufacturer.as_ref().map(|m| m.id)
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }
}
