// ==========================================
// 质检报告系统 - 零件号仓储
// ==========================================
// 职责: 管理 part_number 表
// 说明: 零件号除名称外还携带描述/平台/供应商，选中后只读带入检验记录
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{NewPartNumber, PartNumber};
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct PartNumberRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartNumberRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS part_number (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              number TEXT NOT NULL UNIQUE,
              description TEXT NOT NULL DEFAULT '',
              platform TEXT NOT NULL DEFAULT '',
              supplier TEXT NOT NULL DEFAULT '',
              active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_part_number_active ON part_number(active);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PartNumber> {
        Ok(PartNumber {
            id: row.get(0)?,
            number: row.get(1)?,
            description: row.get(2)?,
            platform: row.get(3)?,
            supplier: row.get(4)?,
            active: row.get::<_, i64>(5)? != 0,
        })
    }

    pub fn list(&self, include_inactive: bool) -> RepositoryResult<Vec<PartNumber>> {
        let conn = self.get_conn()?;
        let sql = if include_inactive {
            "SELECT id, number, description, platform, supplier, active
             FROM part_number ORDER BY number"
        } else {
            "SELECT id, number, description, platform, supplier, active
             FROM part_number WHERE active = 1 ORDER BY number"
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<PartNumber>> {
        let conn = self.get_conn()?;
        let item = conn
            .query_row(
                "SELECT id, number, description, platform, supplier, active
                 FROM part_number WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(item)
    }

    /// 新建零件号，返回 id
    pub fn create(&self, payload: &NewPartNumber) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO part_number (number, description, platform, supplier)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                payload.number,
                payload.description,
                payload.platform,
                payload.supplier
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新零件号
    pub fn update(&self, id: i64, payload: &NewPartNumber) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE part_number
            SET number = ?1, description = ?2, platform = ?3, supplier = ?4,
                updated_at = datetime('now')
            WHERE id = ?5
            "#,
            params![
                payload.number,
                payload.description,
                payload.platform,
                payload.supplier,
                id
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PartNumber".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE part_number SET active = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![active as i64, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PartNumber".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM part_number WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PartNumber".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
