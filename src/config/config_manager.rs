// ==========================================
// 质检报告系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 满班时数（小时），提交校验的 8 小时门槛
    pub const FULL_SHIFT_HOURS: &str = "full_shift_hours";

    /// 账号状态轮询间隔（秒）
    pub const STATUS_POLL_INTERVAL_SECS: &str = "status_poll_interval_secs";

    /// 默认界面语言
    pub const DEFAULT_LOCALE: &str = "default_locale";
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

        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn ensure_table(&self) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL DEFAULT 'global',
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    // ===== 提交规则配置 =====

    /// 获取满班时数门槛
    ///
    /// # 返回
    /// - f64: 小时数（默认 8.0），格式非法时回退默认
    pub fn get_full_shift_hours(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::FULL_SHIFT_HOURS, "8")?;
        let hours = value.parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::FULL_SHIFT_HOURS,
                raw_value = %value,
                "满班时数配置格式错误，使用默认值"
            );
            crate::FULL_SHIFT_HOURS
        });
        Ok(hours)
    }

    // ===== 会话配置 =====

    /// 获取账号状态轮询间隔（秒，默认 10）
    pub fn get_status_poll_interval_secs(&self) -> Result<u64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::STATUS_POLL_INTERVAL_SECS, "10")?;
        Ok(value.parse::<u64>().unwrap_or(10))
    }

    // ===== 界面配置 =====

    /// 获取默认界面语言（默认 zh-CN）
    pub fn get_default_locale(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::DEFAULT_LOCALE, "zh-CN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_unset() {
        let file = NamedTempFile::new().unwrap();
        let mgr = ConfigManager::new(file.path().to_str().unwrap()).unwrap();

        assert_eq!(mgr.get_full_shift_hours().unwrap(), 8.0);
        assert_eq!(mgr.get_status_poll_interval_secs().unwrap(), 10);
        assert_eq!(mgr.get_default_locale().unwrap(), "zh-CN");
    }

    #[test]
    fn test_set_and_read_back() {
        let file = NamedTempFile::new().unwrap();
        let mgr = ConfigManager::new(file.path().to_str().unwrap()).unwrap();

        mgr.set_global_config_value(config_keys::FULL_SHIFT_HOURS, "7.5")
            .unwrap();
        assert_eq!(mgr.get_full_shift_hours().unwrap(), 7.5);

        // UPSERT 覆盖
        mgr.set_global_config_value(config_keys::FULL_SHIFT_HOURS, "8")
            .unwrap();
        assert_eq!(mgr.get_full_shift_hours().unwrap(), 8.0);
    }

    #[test]
    fn test_malformed_value_falls_back() {
        let file = NamedTempFile::new().unwrap();
        let mgr = ConfigManager::new(file.path().to_str().unwrap()).unwrap();

        mgr.set_global_config_value(config_keys::FULL_SHIFT_HOURS, "ocho")
            .unwrap();
        assert_eq!(mgr.get_full_shift_hours().unwrap(), 8.0);
    }
}
