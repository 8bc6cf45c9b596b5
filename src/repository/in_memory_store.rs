// ==========================================
// 零件库 BOM 导入器 - 内存实体存储
// ==========================================
// 职责: EntityLookup 的内存实现（测试夹具 / 嵌入调用方）
// 说明: 名称、mpnr、ipn 忽略大小写匹配，与 SQLite NOCASE 排序规则一致
// ==========================================

use crate::domain::{BomEntry, BomTarget, Category, Manufacturer, NamedKey, Part, PartKey};
use crate::repository::entity_lookup::EntityLookup;
use crate::repository::error::RepositoryResult;

#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    parts: Vec<Part>,
    manufacturers: Vec<Manufacturer>,
    categories: Vec<Category>,
    bom_entries: Vec<BomEntry>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: Manufacturer) -> Self {
        self.manufacturers.push(manufacturer);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// 添加已存在的 BOM 条目（必须带 id）
    pub fn with_bom_entry(mut self, entry: BomEntry) -> Self {
        self.bom_entries.push(entry);
        self
    }
}

fn eq_nocase(stored: Option<&str>, wanted: &str) -> bool {
    stored.is_some_and(|s| s.to_lowercase() == wanted.to_lowercase())
}

fn find_named<'a, T>(
    items: &'a [T],
    key: &NamedKey,
    id_of: impl Fn(&T) -> i64,
    name_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    match key {
        NamedKey::Id(id) => items.iter().find(|item| id_of(item) == *id),
        NamedKey::Name(name) => items
            .iter()
            .find(|item| eq_nocase(Some(name_of(item)), name)),
    }
}

impl EntityLookup for InMemoryEntityStore {
    fn find_part(&self, key: &PartKey) -> RepositoryResult<Option<Part>> {
        let found = self.parts.iter().find(|part| match key {
            PartKey::Id(id) => part.id == *id,
            PartKey::Mpnr(mpnr) => eq_nocase(part.manufacturer_product_number.as_deref(), mpnr),
            PartKey::Ipn(ipn) => eq_nocase(part.ipn.as_deref(), ipn),
            PartKey::Name(name) => eq_nocase(Some(&part.name), name),
        });
        Ok(found.cloned())
    }

    fn find_manufacturer(&self, key: &NamedKey) -> RepositoryResult<Option<Manufacturer>> {
        Ok(find_named(&self.manufacturers, key, |m| m.id, |m| &m.name).cloned())
    }

    fn find_category(&self, key: &NamedKey) -> RepositoryResult<Option<Category>> {
        Ok(find_named(&self.categories, key, |c| c.id, |c| &c.name).cloned())
    }

    fn find_bom_entry_by_part(
        &self,
        target: BomTarget,
        part_id: i64,
    ) -> RepositoryResult<Option<BomEntry>> {
        let found = self.bom_entries.iter().find(|entry| {
            entry.target == target && entry.part.as_ref().is_some_and(|p| p.id == part_id)
        });
        Ok(found.cloned())
    }

    fn find_bom_entry_by_name(
        &self,
        target: BomTarget,
        name: &str,
    ) -> RepositoryResult<Option<BomEntry>> {
        let found = self
            .bom_entries
            .iter()
            .find(|entry| entry.target == target && entry.name.as_deref() == Some(name));
        Ok(found.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryEntityStore {
        InMemoryEntityStore::new()
            .with_part(Part::new(5, "R1").with_mpnr("RC0805FR-0710KL").with_ipn("IPN-005"))
            .with_manufacturer(Manufacturer {
                id: 2,
                name: "Yageo".to_string(),
            })
    }

    #[test]
    fn test_find_part_by_each_key() {
        let store = store();

        assert!(store.find_part(&PartKey::Id(5)).unwrap().is_some());
        assert!(store
            .find_part(&PartKey::Mpnr("rc0805fr-0710kl".to_string()))
            .unwrap()
            .is_some());
        assert!(store.find_part(&PartKey::Ipn("IPN-005".to_string())).unwrap().is_some());
        assert!(store.find_part(&PartKey::Name("r1".to_string())).unwrap().is_some());
        assert!(store.find_part(&PartKey::Id(6)).unwrap().is_none());
    }

    #[test]
    fn test_find_bom_entry_scoped_by_target() {
        let mut entry = BomEntry::new(BomTarget::Project(1));
        entry.id = Some(10);
        entry.name = Some("Connector".to_string());
        let store = store().with_bom_entry(entry);

        assert!(store
            .find_bom_entry_by_name(BomTarget::Project(1), "Connector")
            .unwrap()
            .is_some());
        assert!(store
            .find_bom_entry_by_name(BomTarget::Assembly(1), "Connector")
            .unwrap()
            .is_none());
    }
}
