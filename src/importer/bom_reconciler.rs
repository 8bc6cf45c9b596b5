// ==========================================
// 零件库 BOM 导入器 - 条目对账（阶段 4）
// ==========================================
// 职责: 合并零件字段，复用或新建 BOM 条目，写入数量与名称
// 规则:
// - 条目查找: 先按关联零件，再按导入名称，均无则新建
// - 数量总是覆盖
// - 名称: 未提供 → 不变；空白 → 清除；与零件名相同 → 不变；不同 → 覆写
// 红线: 只修改内存中的副本，不写回存储
// ==========================================

use crate::domain::{BomEntry, BomTarget, Part};
use crate::importer::entity_resolver::ResolvedPart;
use crate::importer::error::ImportError;
use crate::importer::field_validator::{NameField, ValidatedRecord};
use crate::importer::kicad_parser::KicadRow;
use crate::repository::EntityLookup;
use tracing::debug;

pub struct BomReconciler<'a> {
    lookup: &'a dyn EntityLookup,
}

impl<'a> BomReconciler<'a> {
    pub fn new(lookup: &'a dyn EntityLookup) -> Self {
        Self { lookup }
    }

    /// JSON/CSV 记录 → BOM 条目
    pub fn reconcile(
        &self,
        record: ValidatedRecord,
        resolved: Option<ResolvedPart>,
        target: BomTarget,
    ) -> Result<BomEntry, ImportError> {
        let given_name = match &record.name {
            NameField::Given(name) => Some(name.as_str()),
            _ => None,
        };

        let mut entry = match resolved {
            Some(resolved) => {
                let part = merge_part(resolved);
                let mut entry = self.find_or_create(target, Some(part.id), given_name)?;
                apply_part_name(&mut entry, &record.name, &part.name);
                entry.part = Some(part);
                entry
            }
            None => {
                let mut entry = self.find_or_create(target, None, given_name)?;
                apply_free_text_name(&mut entry, &record.name);
                entry
            }
        };

        entry.quantity = record.quantity;
        if let Some(mountnames) = record.mountnames {
            entry.mountnames = mountnames;
        }
        if let Some(comment) = record.comment {
            entry.comment = comment;
        }
        Ok(entry)
    }

    /// KiCad 行 → BOM 条目（不关联零件）
    pub fn reconcile_kicad(&self, row: &KicadRow, target: BomTarget) -> Result<BomEntry, ImportError> {
        let name = row.entry_name();
        let mut entry = self.find_or_create(target, None, Some(&name))?;
        entry.name = Some(name);
        entry.mountnames = row.designator.clone();
        entry.comment = row.supplier_and_ref.clone();
        entry.quantity = row.quantity;
        Ok(entry)
    }

    fn find_or_create(
        &self,
        target: BomTarget,
        part_id: Option<i64>,
        name: Option<&str>,
    ) -> Result<BomEntry, ImportError> {
        if let Some(part_id) = part_id {
            if let Some(entry) = self.lookup.find_bom_entry_by_part(target, part_id)? {
                debug!(entry_id = ?entry.id, part_id, "按零件复用 BOM 条目");
                return Ok(entry);
            }
        }
        if let Some(name) = name {
            if let Some(entry) = self.lookup.find_bom_entry_by_name(target, name)? {
                debug!(entry_id = ?entry.id, name, "按名称复用 BOM 条目");
                return Ok(entry);
            }
        }
        Ok(BomEntry::new(target))
    }
}

/// 将解析得到的描述/制造商/分类合并到零件副本
fn merge_part(resolved: ResolvedPart) -> Part {
    let mut part = resolved.part;

    if let Some(description) = resolved.description {
        if description != part.description {
            part.description = description;
        }
    }
    if let Some(manufacturer) = resolved.manufacturer {
        if part.manufacturer_id() != Some(manufacturer.id) {
            part.manufacturer = Some(manufacturer);
        }
    }
    if let Some(category) = resolved.category {
        if part.category_id() != Some(category.id) {
            part.category = Some(category);
        }
    }
    part
}

fn apply_part_name(entry: &mut BomEntry, name: &NameField, part_name: &str) {
    match name {
        NameField::Absent => {}
        NameField::Blank => entry.name = None,
        NameField::Given(name) if name == part_name => {}
        NameField::Given(name) => entry.name = Some(name.clone()),
    }
}

fn apply_free_text_name(entry: &mut BomEntry, name: &NameField) {
    match name {
        NameField::Absent => {}
        NameField::Blank => entry.name = None,
        NameField::Given(name) => entry.name = Some(name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Manufacturer};
    use crate::repository::InMemoryEntityStore;

    const TARGET: BomTarget = BomTarget::Project(1);

    fn record(name: NameField) -> ValidatedRecord {
        ValidatedRecord {
            index: 0,
            quantity: 3.0,
            name,
            mountnames: None,
            comment: None,
            part: None,
        }
    }

    fn resolved(part: Part) -> ResolvedPart {
        ResolvedPart {
            part,
            description: None,
            manufacturer: None,
            category: None,
        }
    }

    fn existing_entry(id: i64, part: Option<Part>, name: Option<&str>) -> BomEntry {
        let mut entry = BomEntry::new(TARGET);
        entry.id = Some(id);
        entry.part = part;
        entry.name = name.map(str::to_string);
        entry.quantity = 10.0;
        entry
    }

    #[test]
    fn test_new_entry_for_part() {
        let store = InMemoryEntityStore::new();
        let entry = BomReconciler::new(&store)
            .reconcile(record(NameField::Absent), Some(resolved(Part::new(5, "R1"))), TARGET)
            .unwrap();

        assert!(entry.is_new());
        assert_eq!(entry.quantity, 3.0);
        assert_eq!(entry.part.unwrap().id, 5);
        assert_eq!(entry.name, None);
    }

    #[test]
    fn test_reuses_entry_by_part_and_overwrites_quantity() {
        let store = InMemoryEntityStore::new().with_bom_entry(existing_entry(
            40,
            Some(Part::new(5, "R1")),
            Some("Pull-up"),
        ));
        let entry = BomReconciler::new(&store)
            .reconcile(record(NameField::Absent), Some(resolved(Part::new(5, "R1"))), TARGET)
            .unwrap();

        assert_eq!(entry.id, Some(40));
        assert_eq!(entry.quantity, 3.0);
        assert_eq!(entry.name.as_deref(), Some("Pull-up"));
    }

    #[test]
    fn test_entries_of_other_targets_are_ignored() {
        let mut other = existing_entry(41, Some(Part::new(5, "R1")), None);
        other.target = BomTarget::Assembly(1);
        let store = InMemoryEntityStore::new().with_bom_entry(other);

        let entry = BomReconciler::new(&store)
            .reconcile(record(NameField::Absent), Some(resolved(Part::new(5, "R1"))), TARGET)
            .unwrap();

        assert!(entry.is_new());
    }

    #[test]
    fn test_name_rules_for_part_entries() {
        let store = InMemoryEntityStore::new().with_bom_entry(existing_entry(
            40,
            Some(Part::new(5, "R1")),
            Some("Pull-up"),
        ));
        let reconciler = BomReconciler::new(&store);
        let reconcile = |name| {
            reconciler
                .reconcile(record(name), Some(resolved(Part::new(5, "R1"))), TARGET)
                .unwrap()
                .name
        };

        assert_eq!(reconcile(NameField::Absent).as_deref(), Some("Pull-up"));
        assert_eq!(reconcile(NameField::Blank), None);
        assert_eq!(reconcile(NameField::Given("R1".to_string())).as_deref(), Some("Pull-up"));
        assert_eq!(
            reconcile(NameField::Given("Pull-down".to_string())).as_deref(),
            Some("Pull-down")
        );
    }

    #[test]
    fn test_reuses_entry_by_name_when_part_not_linked() {
        let store =
            InMemoryEntityStore::new().with_bom_entry(existing_entry(7, None, Some("Jumper")));
        let entry = BomReconciler::new(&store)
            .reconcile(
                record(NameField::Given("Jumper".to_string())),
                Some(resolved(Part::new(5, "R1"))),
                TARGET,
            )
            .unwrap();

        assert_eq!(entry.id, Some(7));
        assert_eq!(entry.part.unwrap().id, 5);
        assert_eq!(entry.name.as_deref(), Some("Jumper"));
    }

    #[test]
    fn test_free_text_entry() {
        let store = InMemoryEntityStore::new();
        let mut input = record(NameField::Given("Heatsink".to_string()));
        input.mountnames = Some("HS1".to_string());
        input.comment = Some("glue".to_string());

        let entry = BomReconciler::new(&store).reconcile(input, None, TARGET).unwrap();

        assert!(entry.part.is_none());
        assert_eq!(entry.name.as_deref(), Some("Heatsink"));
        assert_eq!(entry.mountnames, "HS1");
        assert_eq!(entry.comment, "glue");
    }

    #[test]
    fn test_merge_part_fields() {
        let part = Part::new(5, "R1")
            .with_description("old")
            .with_manufacturer(Manufacturer {
                id: 1,
                name: "Old Corp".to_string(),
            });
        let merged = merge_part(ResolvedPart {
            part,
            description: Some("10k 1%".to_string()),
            manufacturer: Some(Manufacturer {
                id: 3,
                name: "Yageo".to_string(),
            }),
            category: Some(Category {
                id: 9,
                name: "Resistors".to_string(),
            }),
        });

        assert_eq!(merged.description, "10k 1%");
        assert_eq!(merged.manufacturer_id(), Some(3));
        assert_eq!(merged.category_id(), Some(9));
    }

    #[test]
    fn test_reconcile_kicad_row() {
        let store = InMemoryEntityStore::new();
        let row = KicadRow {
            index: 0,
            line: 2,
            designator: "R1".to_string(),
            package: "0805".to_string(),
            quantity: 2.0,
            designation: "10k resistor".to_string(),
            supplier_and_ref: "Supplier X".to_string(),
        };

        let entry = BomReconciler::new(&store).reconcile_kicad(&row, TARGET).unwrap();

        assert_eq!(entry.name.as_deref(), Some("10k resistor (0805)"));
        assert_eq!(entry.mountnames, "R1");
        assert_eq!(entry.comment, "Supplier X");
        assert_eq!(entry.quantity, 2.0);
        assert!(entry.part.is_none());
    }
}
