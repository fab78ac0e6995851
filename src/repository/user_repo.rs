// ==========================================
// 质检报告系统 - 用户仓储
// ==========================================
// 职责: 管理 app_user 表（登录校验、状态轮询、用户维护）
// 说明: role_id/role_text 按原始值存储，规范角色由 RoleResolver 归一化
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{NewUser, User};
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
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
            CREATE TABLE IF NOT EXISTS app_user (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              name TEXT NOT NULL,
              username TEXT NOT NULL UNIQUE,
              email TEXT NOT NULL DEFAULT '',
              role_id INTEGER,
              role_text TEXT NOT NULL DEFAULT '',
              active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_app_user_username ON app_user(username);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            username: row.get(2)?,
            email: row.get(3)?,
            role_id: row.get(4)?,
            role_text: row.get(5)?,
            active: row.get::<_, i64>(6)? != 0,
        })
    }

    const COLS: &'static str = "id, name, username, email, role_id, role_text, active";

    pub fn list(&self) -> RepositoryResult<Vec<User>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM app_user ORDER BY name",
            Self::COLS
        ))?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM app_user WHERE id = ?1", Self::COLS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    /// 按登录名查找（登录入口）
    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM app_user WHERE username = ?1", Self::COLS),
                params![username],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    /// 账号是否仍然启用（状态轮询用，用户不存在视为停用）
    pub fn is_active(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let active: Option<i64> = conn
            .query_row(
                "SELECT active FROM app_user WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(active.map(|v| v != 0).unwrap_or(false))
    }

    /// 新建用户，返回 id
    pub fn create(&self, payload: &NewUser) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO app_user (name, username, email, role_id, role_text)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                payload.name,
                payload.username,
                payload.email,
                payload.role_id,
                payload.role_text
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新用户资料
    pub fn update(&self, id: i64, payload: &NewUser) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE app_user
            SET name = ?1, username = ?2, email = ?3, role_id = ?4, role_text = ?5,
                updated_at = datetime('now')
            WHERE id = ?6
            "#,
            params![
                payload.name,
                payload.username,
                payload.email,
                payload.role_id,
                payload.role_text,
                id
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "User".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 启用/停用账号
    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE app_user SET active = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![active as i64, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "User".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM app_user WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "User".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
