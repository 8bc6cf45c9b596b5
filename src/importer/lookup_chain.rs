// ==========================================
// 零件库 BOM 导入器 - 有序查找链
// ==========================================
// 职责: 按声明顺序依次尝试候选键，返回首个命中
// 用途: 零件 id → mpnr → ipn → name；制造商/分类 id → name
// ==========================================

use crate::repository::RepositoryResult;
use std::fmt::Debug;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct LookupChain<K> {
    keys: Vec<K>,
}

impl<K: Debug> LookupChain<K> {
    pub fn new(keys: Vec<K>) -> Self {
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 依次调用 finder，首个 Some 即停止
    ///
    /// # 返回
    /// - Ok(Some((key, entity))): 命中的键与实体
    /// - Ok(None): 所有键均未命中（或无候选键）
    /// - Err: 查找失败（立即中止）
    pub fn resolve<T, F>(&self, mut finder: F) -> RepositoryResult<Option<(&K, T)>>
    where
        F: FnMut(&K) -> RepositoryResult<Option<T>>,
    {
        for key in &self.keys {
            if let Some(entity) = finder(key)? {
                debug!(key = ?key, "查找命中");
                return Ok(Some((key, entity)));
            }
        }
        Ok(None)
    }
}
