// ==========================================
// 零件库 BOM 导入器 - 数据仓储层
// ==========================================
// 职责: 导入器依赖的实体查找协作方
// 红线: 只读；持久化与提交由调用方负责
// ==========================================

pub mod entity_lookup;
pub mod error;
pub mod in_memory_store;
pub mod sqlite_lookup;

// 重导出
pub use entity_lookup::EntityLookup;
pub use error::{RepositoryError, RepositoryResult};
pub use in_memory_store::InMemoryEntityStore;
pub use sqlite_lookup::{init_schema, SqliteEntityLookup};
