// ==========================================
// 零件库 BOM 导入器 - SQLite 实体查找实现
// ==========================================
// 职责: 基于 rusqlite 实现 EntityLookup（只读）
// 红线: Repository 不含业务规则，只做数据查询
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::{BomEntry, BomTarget, Category, Manufacturer, NamedKey, Part, PartKey};
use crate::repository::entity_lookup::EntityLookup;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const PART_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.manufacturer_product_number, p.ipn,
           m.id, m.name, c.id, c.name
    FROM parts p
    LEFT JOIN manufacturers m ON m.id = p.manufacturer_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

const BOM_ENTRY_SELECT: &str = r#"
    SELECT id, part_id, name, quantity, mountnames, comment
    FROM bom_entries
"#;

/// 初始化查找所需的表结构（幂等，供测试与工具使用）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS manufacturers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS parts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            manufacturer_product_number TEXT,
            ipn TEXT,
            manufacturer_id INTEGER REFERENCES manufacturers(id),
            category_id INTEGER REFERENCES categories(id)
        );
        CREATE TABLE IF NOT EXISTS bom_entries (
            id INTEGER PRIMARY KEY,
            target_kind TEXT NOT NULL CHECK (target_kind IN ('project', 'assembly')),
            target_id INTEGER NOT NULL,
            part_id INTEGER REFERENCES parts(id),
            name TEXT,
            quantity REAL NOT NULL DEFAULT 1,
            mountnames TEXT NOT NULL DEFAULT '',
            comment TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_bom_entries_target ON bom_entries (target_kind, target_id);
        "#,
    )
}

// ==========================================
// SqliteEntityLookup
// ==========================================
pub struct SqliteEntityLookup {
    conn: Arc<Mutex<Connection>>,
}

/// bom_entries 行（零件另行加载）
struct BomEntryRow {
    id: i64,
    part_id: Option<i64>,
    name: Option<String>,
    quantity: f64,
    mountnames: String,
    comment: String,
}

impl SqliteEntityLookup {
    /// 创建新的查找实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（会再次应用统一 PRAGMA，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_part(row: &Row<'_>) -> rusqlite::Result<Part> {
        let manufacturer = match (row.get::<_, Option<i64>>(5)?, row.get::<_, Option<String>>(6)?) {
            (Some(id), Some(name)) => Some(Manufacturer { id, name }),
            _ => None,
        };
        let category = match (row.get::<_, Option<i64>>(7)?, row.get::<_, Option<String>>(8)?) {
            (Some(id), Some(name)) => Some(Category { id, name }),
            _ => None,
        };

        Ok(Part {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            manufacturer_product_number: row.get(3)?,
            ipn: row.get(4)?,
            manufacturer,
            category,
        })
    }

    fn map_bom_entry_row(row: &Row<'_>) -> rusqlite::Result<BomEntryRow> {
        Ok(BomEntryRow {
            id: row.get(0)?,
            part_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            mountnames: row.get(4)?,
            comment: row.get(5)?,
        })
    }

    /// 行数据 → BomEntry（会再次加锁加载零件，调用前须释放连接锁）
    fn hydrate_bom_entry(
        &self,
        target: BomTarget,
        row: BomEntryRow,
    ) -> RepositoryResult<BomEntry> {
        let part = match row.part_id {
            Some(part_id) => Some(self.find_part(&PartKey::Id(part_id))?.ok_or_else(|| {
                RepositoryError::DataIntegrityError {
                    entity: "bom_entries".to_string(),
                    id: row.id,
                    message: format!("关联零件不存在: part_id={}", part_id),
                }
            })?),
            None => None,
        };

        Ok(BomEntry {
            id: Some(row.id),
            target,
            quantity: row.quantity,
            name: row.name,
            mountnames: row.mountnames,
            comment: row.comment,
            part,
        })
    }

    fn find_named(
        &self,
        table: &str,
        key: &NamedKey,
    ) -> RepositoryResult<Option<(i64, String)>> {
        let conn = self.lock()?;
        let (condition, value): (&str, Box<dyn ToSql>) = match key {
            NamedKey::Id(id) => ("id = ?1", Box::new(*id)),
            NamedKey::Name(name) => ("name = ?1 COLLATE NOCASE", Box::new(name.clone())),
        };
        let sql = format!(
            "SELECT id, name FROM {} WHERE {} ORDER BY id LIMIT 1",
            table, condition
        );

        let found = conn
            .query_row(&sql, [value.as_ref()], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        Ok(found)
    }
}

impl EntityLookup for SqliteEntityLookup {
    fn find_part(&self, key: &PartKey) -> RepositoryResult<Option<Part>> {
        let conn = self.lock()?;
        let (condition, value): (&str, Box<dyn ToSql>) = match key {
            PartKey::Id(id) => ("p.id = ?1", Box::new(*id)),
            PartKey::Mpnr(mpnr) => (
                "p.manufacturer_product_number = ?1 COLLATE NOCASE",
                Box::new(mpnr.clone()),
            ),
            PartKey::Ipn(ipn) => ("p.ipn = ?1 COLLATE NOCASE", Box::new(ipn.clone())),
            PartKey::Name(name) => ("p.name = ?1 COLLATE NOCASE", Box::new(name.clone())),
        };
        let sql = format!("{} WHERE {} ORDER BY p.id LIMIT 1", PART_SELECT, condition);

        let part = conn
            .query_row(&sql, [value.as_ref()], Self::map_part)
            .optional()?;
        Ok(part)
    }

    fn find_manufacturer(&self, key: &NamedKey) -> RepositoryResult<Option<Manufacturer>> {
        Ok(self
            .find_named("manufacturers", key)?
            .map(|(id, name)| Manufacturer { id, name }))
    }

    fn find_category(&self, key: &NamedKey) -> RepositoryResult<Option<Category>> {
        Ok(self
            .find_named("categories", key)?
            .map(|(id, name)| Category { id, name }))
    }

    fn find_bom_entry_by_part(
        &self,
        target: BomTarget,
        part_id: i64,
    ) -> RepositoryResult<Option<BomEntry>> {
        let row = {
            let conn = self.lock()?;
            let sql = format!(
                "{} WHERE target_kind = ?1 AND target_id = ?2 AND part_id = ?3 ORDER BY id LIMIT 1",
                BOM_ENTRY_SELECT
            );
            conn.query_row(
                &sql,
                params![target.kind(), target.id(), part_id],
                Self::map_bom_entry_row,
            )
            .optional()?
        };

        row.map(|row| self.hydrate_bom_entry(target, row)).transpose()
    }

    fn find_bom_entry_by_name(
        &self,
        target: BomTarget,
        name: &str,
    ) -> RepositoryResult<Option<BomEntry>> {
        let row = {
            let conn = self.lock()?;
            let sql = format!(
                "{} WHERE target_kind = ?1 AND target_id = ?2 AND name = ?3 ORDER BY id LIMIT 1",
                BOM_ENTRY_SELECT
            );
            conn.query_row(
                &sql,
                params![target.kind(), target.id(), name],
                Self::map_bom_entry_row,
            )
            .optional()?
        };

        row.map(|row| self.hydrate_bom_entry(target, row)).transpose()
    }
}
