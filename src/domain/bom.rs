// ==========================================
// 零件库 BOM 导入器 - BOM 条目
// ==========================================
// 职责: 项目/组件 BOM 的单行记录
// 说明: id 为 None 表示本次导入新建；Some 表示复用已有条目（原地更新）
// ==========================================

use crate::domain::part::Part;
use crate::domain::types::BomTarget;
use serde::{Deserialize, Serialize};

// ==========================================
// BomEntry - BOM 条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    pub id: Option<i64>,        // 已存在条目的主键
    pub target: BomTarget,      // 所属项目/组件
    pub quantity: f64,          // 数量（> 0）
    pub name: Option<String>,   // 显示名称覆盖；无零件时即条目名称
    pub mountnames: String,     // 位号（如 "R1,R2"）
    pub comment: String,        // 备注
    pub part: Option<Part>,     // 关联零件（自由文本条目为 None）
}

impl BomEntry {
    /// 新建空条目（数量默认 1）
    pub fn new(target: BomTarget) -> Self {
        Self {
            id: None,
            target,
            quantity: 1.0,
            name: None,
            mountnames: String::new(),
            comment: String::new(),
            part: None,
        }
    }

    /// 是否为本次导入新建的条目
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// 展示名称：优先使用覆盖名称，其次零件名称
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.part.as_ref().map(|p| p.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_override() {
        let mut entry = BomEntry::new(BomTarget::Project(1));
        assert_eq!(entry.display_name(), None);

        entry.part = Some(Part::new(5, "R1"));
        assert_eq!(entry.display_name(), Some("R1"));

        entry.name = Some("Pull-up".to_string());
        assert_eq!(entry.display_name(), Some("Pull-up"));
    }
}
