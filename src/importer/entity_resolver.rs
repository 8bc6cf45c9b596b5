// ==========================================
// 零件库 BOM 导入器 - 实体解析（阶段 3）
// ==========================================
// 职责: 候选键 → Part / Manufacturer / Category
// 规则:
// - 零件按 id → mpnr → ipn → name 查找，首个命中为准
// - 命中后，提供的 name / mpnr / ipn 须与实体值完全一致（查找可忽略大小写）
// - 制造商/分类按 id → name 查找，名称同样须完全一致
// - 未找到时记录 not_found_for，参数为全部导入键的摘要
// ==========================================

use crate::domain::{Category, Manufacturer, NamedKey, Part, PartKey, Violation};
use crate::importer::error::ImportError;
use crate::importer::field_validator::{Candidate, NamedKeys, PartCandidates};
use crate::importer::lookup_chain::LookupChain;
use crate::importer::violation_builder::{templates, ViolationBuilder};
use crate::repository::{EntityLookup, RepositoryResult};
use tracing::debug;

// ==========================================
// ResolvedPart - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPart {
    pub part: Part,
    pub description: Option<String>,
    pub manufacturer: Option<Manufacturer>,
    pub category: Option<Category>,
}

/// 可按 id / 名称匹配的实体
trait NamedEntity {
    fn entity_id(&self) -> i64;
    fn entity_name(&self) -> &str;
}

impl NamedEntity for Manufacturer {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn entity_name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for Category {
    fn entity_id(&self) -> i64 {
        self.id
    }

    fn entity_name(&self) -> &str {
        &self.name
    }
}

pub struct EntityResolver<'a> {
    lookup: &'a dyn EntityLookup,
}

impl<'a> EntityResolver<'a> {
    pub fn new(lookup: &'a dyn EntityLookup) -> Self {
        Self { lookup }
    }

    /// 解析记录中的 part 子对象
    ///
    /// # 返回
    /// - Ok(Some(ResolvedPart)): 找到零件（是否有违规仍需由调用方检查）
    /// - Ok(None): 未找到零件（已记录违规）
    /// - Err: 查找失败
    pub fn resolve(
        &self,
        candidates: &PartCandidates,
        base: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Result<Option<ResolvedPart>, ImportError> {
        let part_path = format!("{}.part", base);
        let part = match self.resolve_part(candidates, &part_path, builder, violations)? {
            Some(part) => part,
            // 零件未找到: 该记录的解析到此中止
            None => return Ok(None),
        };

        let manufacturer = match &candidates.manufacturer {
            Some(keys) => self.resolve_named(
                keys,
                "manufacturer",
                &format!("{}.manufacturer", part_path),
                |key| self.lookup.find_manufacturer(key),
                builder,
                violations,
            )?,
            None => None,
        };
        let category = match &candidates.category {
            Some(keys) => self.resolve_named(
                keys,
                "category",
                &format!("{}.category", part_path),
                |key| self.lookup.find_category(key),
                builder,
                violations,
            )?,
            None => None,
        };

        Ok(Some(ResolvedPart {
            part,
            description: candidates.description.clone(),
            manufacturer,
            category,
        }))
    }

    fn resolve_part(
        &self,
        candidates: &PartCandidates,
        part_path: &str,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Result<Option<Part>, ImportError> {
        let keys = &candidates.keys;
        let chain = LookupChain::new(keys.lookup_keys());

        let part = match chain.resolve(|key| self.lookup.find_part(key))? {
            Some((key, part)) => {
                debug!(part_id = part.id, key = key.field(), "零件已解析");
                part
            }
            None => {
                violations.push(builder.build(
                    templates::NOT_FOUND_FOR,
                    part_path,
                    candidates.raw.clone(),
                    &[
                        ("entity", builder.entity_label("part")),
                        ("value", keys.summary()),
                    ],
                ));
                return Ok(None);
            }
        };

        let part_label = builder.entity_label("part");
        let exact_checks: [(&str, &Candidate<String>, &str); 3] = [
            ("name", &keys.name, part.name.as_str()),
            (
                "mpnr",
                &keys.mpnr,
                part.manufacturer_product_number.as_deref().unwrap_or(""),
            ),
            ("ipn", &keys.ipn, part.ipn.as_deref().unwrap_or("")),
        ];
        for (field, candidate, found_value) in exact_checks {
            if let Some(violation) = exact_match_violation(
                candidate,
                found_value,
                part.id,
                &part_label,
                &format!("{}.{}", part_path, field),
                builder,
            ) {
                violations.push(violation);
            }
        }

        Ok(Some(part))
    }

    fn resolve_named<T, F>(
        &self,
        keys: &NamedKeys,
        entity: &str,
        path: &str,
        finder: F,
        builder: &ViolationBuilder,
        violations: &mut Vec<Violation>,
    ) -> Result<Option<T>, ImportError>
    where
        T: NamedEntity,
        F: FnMut(&NamedKey) -> RepositoryResult<Option<T>>,
    {
        let chain = LookupChain::new(keys.lookup_keys());
        let found = match chain.resolve(finder)? {
            Some((_, found)) => found,
            None => {
                violations.push(builder.build(
                    templates::NOT_FOUND_FOR,
                    path,
                    keys.raw.clone(),
                    &[
                        ("entity", builder.entity_label(entity)),
                        ("value", keys.summary(entity)),
                    ],
                ));
                return Ok(None);
            }
        };

        if let Some(violation) = exact_match_violation(
            &keys.name,
            found.entity_name(),
            found.entity_id(),
            &builder.entity_label(entity),
            &format!("{}.name", path),
            builder,
        ) {
            violations.push(violation);
        }

        Ok(Some(found))
    }
}

/// 提供的值与实体值不完全一致时的违规
fn exact_match_violation(
    candidate: &Candidate<String>,
    found_value: &str,
    found_id: i64,
    entity_label: &str,
    path: &str,
    builder: &ViolationBuilder,
) -> Option<Violation> {
    let supplied = candidate.value()?;
    if supplied == found_value {
        return None;
    }

    let raw = candidate.raw().map(|v| v.to_json()).unwrap_or_default();
    Some(builder.build(
        templates::NO_EXACT_MATCH,
        path,
        raw,
        &[
            ("import_value", candidate.display()),
            ("entity", entity_label.to_string()),
            ("found_id", found_id.to_string()),
            ("found_value", found_value.to_string()),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImportType;
    use crate::i18n::I18nTranslator;
    use crate::importer::field_validator::FieldValidator;
    use crate::importer::record::{RecordValue, SourceRecord};
    use crate::repository::InMemoryEntityStore;
    use serde_json::{json, Value};

    fn store() -> InMemoryEntityStore {
        InMemoryEntityStore::new()
            .with_part(Part::new(5, "R1").with_mpnr("RC0805-10K").with_ipn("IPN-001"))
            .with_manufacturer(Manufacturer {
                id: 3,
                name: "Yageo".to_string(),
            })
            .with_category(Category {
                id: 9,
                name: "Resistors".to_string(),
            })
    }

    fn resolve(store: &InMemoryEntityStore, part: Value) -> (Option<ResolvedPart>, Vec<Violation>) {
        let translator = I18nTranslator::default();
        let builder = ViolationBuilder::new(&translator);
        let record = SourceRecord {
            index: 0,
            value: RecordValue::from_json(json!({"quantity": 1.0, "part": part})),
        };
        let mut violations = Vec::new();
        let validated = FieldValidator::for_import_type(ImportType::Json)
            .validate(&record, &builder, &mut violations)
            .unwrap();
        let resolved = EntityResolver::new(store)
            .resolve(validated.part.as_ref().unwrap(), "entry[0]", &builder, &mut violations)
            .unwrap();
        (resolved, violations)
    }

    #[test]
    fn test_resolve_by_id() {
        let (resolved, violations) = resolve(&store(), json!({"id": 5}));

        assert!(violations.is_empty());
        assert_eq!(resolved.unwrap().part.id, 5);
    }

    #[test]
    fn test_resolve_falls_through_to_later_keys() {
        let (resolved, violations) = resolve(&store(), json!({"id": 99, "ipn": "IPN-001"}));

        assert!(violations.is_empty());
        assert_eq!(resolved.unwrap().part.id, 5);
    }

    #[test]
    fn test_part_not_found_summary() {
        let (resolved, violations) = resolve(&store(), json!({"name": "R2"}));

        assert!(resolved.is_none());
        assert_eq!(violations.len(), 1);
        let violation = &violations[0];
        assert_eq!(violation.property_path(), "entry[0].part");
        assert_eq!(violation.message_template(), templates::NOT_FOUND_FOR);
        assert_eq!(
            violation.parameters().get("value").unwrap(),
            "part.id: -, part.mpnr: -, part.ipn: -, part.name: R2"
        );
        assert_eq!(violation.invalid_value(), &json!({"name": "R2"}));
    }

    #[test]
    fn test_case_differs_is_no_exact_match() {
        let (resolved, violations) = resolve(&store(), json!({"name": "r1"}));

        assert!(resolved.is_some());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property_path(), "entry[0].part.name");
        assert_eq!(violations[0].message_template(), templates::NO_EXACT_MATCH);
        assert_eq!(violations[0].parameters().get("found_id").unwrap(), "5");
        assert_eq!(violations[0].parameters().get("found_value").unwrap(), "R1");
    }

    #[test]
    fn test_secondary_key_mismatch() {
        let (_, violations) = resolve(&store(), json!({"id": 5, "mpnr": "RC0805-22K"}));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property_path(), "entry[0].part.mpnr");
    }

    #[test]
    fn test_manufacturer_and_category_resolution() {
        let (resolved, violations) = resolve(
            &store(),
            json!({"id": 5, "manufacturer": {"name": "Yageo"}, "category": {"id": 9}}),
        );

        assert!(violations.is_empty());
        let resolved = resolved.unwrap();
        assert_eq!(resolved.manufacturer.unwrap().id, 3);
        assert_eq!(resolved.category.unwrap().name, "Resistors");
    }

    #[test]
    fn test_manufacturer_not_found() {
        let (resolved, violations) =
            resolve(&store(), json!({"id": 5, "manufacturer": {"name": "Vishay"}}));

        assert!(resolved.is_some());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property_path(), "entry[0].part.manufacturer");
        assert_eq!(
            violations[0].parameters().get("value").unwrap(),
            "manufacturer.id: -, manufacturer.name: Vishay"
        );
    }

    #[test]
    fn test_category_name_exact_match() {
        let (_, violations) = resolve(&store(), json!({"id": 5, "category": {"name": "resistors"}}));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property_path(), "entry[0].part.category.name");
    }

    #[test]
    fn test_missing_part_aborts_before_manufacturer_and_category() {
        let (resolved, violations) = resolve(
            &store(),
            json!({"name": "R2", "manufacturer": {"name": "Vishay"}, "category": {"name": "Nope"}}),
        );

        assert!(resolved.is_none());
        let paths: Vec<&str> = violations.iter().map(|v| v.property_path()).collect();
        assert_eq!(paths, vec!["entry[0].part"]);
    }
}
