// ==========================================
// 零件库 BOM 导入器 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取导入配置，缺失/格式错误时回退默认值
// 存储: config_kv 表 (scope_id + key + value)
// ==========================================

use crate::config::import_config_trait::ImporterConfigReader;
use crate::config::importer_config::default_extensions;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::ImportType;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    use crate::domain::ImportType;

    pub const LOCALE: &str = "bom_import.locale";
    pub const MAX_RECORDS: &str = "bom_import.max_records";

    /// 扩展名白名单键（值为逗号分隔列表）
    pub fn allowed_extensions(import_type: ImportType) -> String {
        format!("bom_import.extensions.{}", import_type.as_str())
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_config_table(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
            init_config_table(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

/// 创建 config_kv 表（幂等）
fn init_config_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}

// ==========================================
// ImporterConfigReader Trait 实现
// ==========================================
impl ImporterConfigReader for ConfigManager {
    fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self
            .get_config_value(config_keys::LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(value.unwrap_or_else(|| "en".to_string()))
    }

    fn get_max_records(&self) -> Result<Option<usize>, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(config_keys::MAX_RECORDS)? else {
            return Ok(None);
        };

        match raw.trim().parse::<usize>() {
            Ok(0) => Ok(None),
            Ok(max) => Ok(Some(max)),
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::MAX_RECORDS,
                    raw_value = %raw,
                    "记录数上限配置格式错误，不限制记录数"
                );
                Ok(None)
            }
        }
    }

    fn get_allowed_extensions(
        &self,
        import_type: ImportType,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        let key = config_keys::allowed_extensions(import_type);
        let extensions: Vec<String> = self
            .get_config_value(&key)?
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if extensions.is_empty() {
            Ok(default_extensions(import_type))
        } else {
            Ok(extensions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let manager = manager();

        assert_eq!(manager.get_locale().unwrap(), "en");
        assert_eq!(manager.get_max_records().unwrap(), None);
        assert_eq!(
            manager.get_allowed_extensions(ImportType::Csv).unwrap(),
            vec!["csv".to_string()]
        );
    }

    #[test]
    fn test_reads_overrides() {
        let manager = manager();
        manager.set_config_value(config_keys::LOCALE, "zh-CN").unwrap();
        manager.set_config_value(config_keys::MAX_RECORDS, "250").unwrap();
        manager
            .set_config_value(
                &config_keys::allowed_extensions(ImportType::KicadPcbnew),
                "kicad_pcb, .CSV",
            )
            .unwrap();

        assert_eq!(manager.get_locale().unwrap(), "zh-CN");
        assert_eq!(manager.get_max_records().unwrap(), Some(250));
        assert_eq!(
            manager.get_allowed_extensions(ImportType::KicadPcbnew).unwrap(),
            vec!["kicad_pcb".to_string(), "csv".to_string()]
        );
    }

    #[test]
    fn test_malformed_max_records_falls_back() {
        let manager = manager();
        manager.set_config_value(config_keys::MAX_RECORDS, "lots").unwrap();

        assert_eq!(manager.get_max_records().unwrap(), None);
    }
}
