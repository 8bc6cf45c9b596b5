// ==========================================
// 零件库 BOM 导入器 - 实体查找 Trait
// ==========================================
// 职责: 定义导入器所需的只读查找接口（不包含实现）
// 红线: 查找无副作用；导入器从不通过该接口写入
// ==========================================

use crate::domain::{BomEntry, BomTarget, Category, Manufacturer, NamedKey, Part, PartKey};
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

// ==========================================
// EntityLookup Trait
// ==========================================
// 实现者: InMemoryEntityStore, SqliteEntityLookup
pub trait EntityLookup: Send + Sync {
    /// 按单个键查找零件
    ///
    /// # 说明
    /// - 字符串键已去除首尾空白
    /// - 名称类键的匹配规则由存储决定（可忽略大小写）
    fn find_part(&self, key: &PartKey) -> RepositoryResult<Option<Part>>;

    /// 按 id 或名称查找制造商
    fn find_manufacturer(&self, key: &NamedKey) -> RepositoryResult<Option<Manufacturer>>;

    /// 按 id 或名称查找分类
    fn find_category(&self, key: &NamedKey) -> RepositoryResult<Option<Category>>;

    /// 查找目标中关联指定零件的 BOM 条目
    fn find_bom_entry_by_part(
        &self,
        target: BomTarget,
        part_id: i64,
    ) -> RepositoryResult<Option<BomEntry>>;

    /// 查找目标中指定名称的 BOM 条目
    fn find_bom_entry_by_name(
        &self,
        target: BomTarget,
        name: &str,
    ) -> RepositoryResult<Option<BomEntry>>;
}

impl<T: EntityLookup + ?Sized> EntityLookup for Arc<T> {
    fn find_part(&self, key: &PartKey) -> RepositoryResult<Option<Part>> {
        (**self).find_part(key)
    }

    fn find_manufacturer(&self, key: &NamedKey) -> RepositoryResult<Option<Manufacturer>> {
        (**self).find_manufacturer(key)
    }

    fn find_category(&self, key: &NamedKey) -> RepositoryResult<Option<Category>> {
        (**self).find_category(key)
    }

    fn find_bom_entry_by_part(
        &self,
        target: BomTarget,
        part_id: i64,
    ) -> RepositoryResult<Option<BomEntry>> {
        (**self).find_bom_entry_by_part(target, part_id)
    }

    fn find_bom_entry_by_name(
        &self,
        target: BomTarget,
        name: &str,
    ) -> RepositoryResult<Option<BomEntry>> {
        (**self).find_bom_entry_by_name(target, name)
    }
}
