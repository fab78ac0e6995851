// ==========================================
// 质检报告系统 - 通用目录仓储
// ==========================================
// 职责: 管理"id+名称+启用标志"型目录表（班次/检验员/主管/岗位/
//       平台/供应商/缺陷原因/返工原因/不足时数原因）
// 说明: 九类目录共用同一表结构，按 CatalogKind 选表
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::open_sqlite_connection;
use crate::domain::catalog::CatalogItem;
use crate::domain::types::CatalogKind;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
    kind: CatalogKind,
}

impl CatalogRepository {
    pub fn new(db_path: &str, kind: CatalogKind) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
            kind,
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>, kind: CatalogKind) -> RepositoryResult<Self> {
        let repo = Self { conn, kind };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              name TEXT NOT NULL UNIQUE,
              active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_active ON {table}(active);
            "#,
            table = self.kind.table()
        ))?;
        Ok(())
    }

    /// 列出目录项
    ///
    /// # 参数
    /// - include_inactive: 是否包含已停用项（维护界面 true，下拉框 false）
    pub fn list(&self, include_inactive: bool) -> RepositoryResult<Vec<CatalogItem>> {
        let conn = self.get_conn()?;
        let sql = if include_inactive {
            format!(
                "SELECT id, name, active FROM {} ORDER BY name",
                self.kind.table()
            )
        } else {
            format!(
                "SELECT id, name, active FROM {} WHERE active = 1 ORDER BY name",
                self.kind.table()
            )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(CatalogItem {
                id: row.get(0)?,
                name: row.get(1)?,
                active: row.get::<_, i64>(2)? != 0,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<CatalogItem>> {
        let conn = self.get_conn()?;
        let item = conn
            .query_row(
                &format!("SELECT id, name, active FROM {} WHERE id = ?1", self.kind.table()),
                params![id],
                |row| {
                    Ok(CatalogItem {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        active: row.get::<_, i64>(2)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(item)
    }

    /// 新建目录项，返回 id
    pub fn create(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!("INSERT INTO {} (name) VALUES (?1)", self.kind.table()),
            params![name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 重命名目录项
    pub fn rename(&self, id: i64, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            &format!(
                "UPDATE {} SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
                self.kind.table()
            ),
            params![name, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: self.kind.entity_name().to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 启用/停用目录项
    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            &format!(
                "UPDATE {} SET active = ?1, updated_at = datetime('now') WHERE id = ?2",
                self.kind.table()
            ),
            params![active as i64, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: self.kind.entity_name().to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除目录项
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.kind.table()),
            params![id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: self.kind.entity_name().to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn repo(kind: CatalogKind) -> (NamedTempFile, CatalogRepository) {
        let file = NamedTempFile::new().unwrap();
        let repo = CatalogRepository::new(file.path().to_str().unwrap(), kind).unwrap();
        (file, repo)
    }

    #[test]
    fn test_create_and_list() {
        let (_file, repo) = repo(CatalogKind::Shift);
        let id = repo.create("Turno A").unwrap();
        assert!(id > 0);

        let items = repo.list(true).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Turno A");
        assert!(items[0].active);
    }

    #[test]
    fn test_deactivate_hides_from_active_list() {
        let (_file, repo) = repo(CatalogKind::DefectReason);
        let id = repo.create("Rayadura").unwrap();
        repo.set_active(id, false).unwrap();

        assert!(repo.list(false).unwrap().is_empty());
        assert_eq!(repo.list(true).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_unique_violation() {
        let (_file, repo) = repo(CatalogKind::Supplier);
        repo.create("ACME").unwrap();
        let err = repo.create("ACME").unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_file, repo) = repo(CatalogKind::Platform);
        let err = repo.delete(42).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
