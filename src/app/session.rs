// ==========================================
// 质检报告系统 - 会话管理
// ==========================================
// 职责: 登录会话的本地持久化与账号状态轮询
// 说明: 会话恢复/轮询都要重新核对账号启用状态，
//       管理员停用账号后，已登录会话应在下一次轮询内退出
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::auth_api::{AuthApi, LoginSession};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::Role;

/// 持久化到缓存文件的会话快照（只存身份引用，不存权限）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    user_id: i64,
    username: String,
    role: Role,
}

// ==========================================
// SessionStore - 会话存储
// ==========================================
pub struct SessionStore {
    cache_path: PathBuf,
    current: Mutex<Option<LoginSession>>,
}

impl SessionStore {
    /// 使用默认缓存路径创建（用户数据目录下的 session.json）
    pub fn new() -> Self {
        Self::with_cache_path(Self::default_cache_path())
    }

    /// 使用指定缓存路径创建（测试/多实例场景）
    pub fn with_cache_path(cache_path: impl AsRef<Path>) -> Self {
        Self {
            cache_path: cache_path.as_ref().to_path_buf(),
            current: Mutex::new(None),
        }
    }

    fn default_cache_path() -> PathBuf {
        let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        #[cfg(debug_assertions)]
        {
            dir = dir.join("inspection-qc-dev");
        }
        #[cfg(not(debug_assertions))]
        {
            dir = dir.join("inspection-qc");
        }
        std::fs::create_dir_all(&dir).ok();
        dir.join("session.json")
    }

    fn set_current(&self, session: Option<LoginSession>) -> ApiResult<()> {
        let mut guard = self
            .current
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话锁获取失败: {}", e)))?;
        *guard = session;
        Ok(())
    }

    /// 当前内存中的会话
    pub fn current_user(&self) -> Option<LoginSession> {
        self.current.lock().ok().and_then(|g| g.clone())
    }

    /// 登录并持久化会话
    pub fn login(&self, auth: &AuthApi, username: &str) -> ApiResult<LoginSession> {
        let session = auth.login(username)?;

        let stored = StoredSession {
            user_id: session.user.id,
            username: session.user.username.clone(),
            role: session.role,
        };
        let json = serde_json::to_string(&stored)
            .map_err(|e| ApiError::InternalError(format!("会话序列化失败: {}", e)))?;
        std::fs::write(&self.cache_path, json)
            .map_err(|e| ApiError::InternalError(format!("会话写入失败: {}", e)))?;

        self.set_current(Some(session.clone()))?;
        Ok(session)
    }

    /// 启动时恢复会话: 读缓存 → 重新核对账号状态与角色
    ///
    /// 缓存缺失/损坏/账号已停用都按"未登录"处理并清理缓存
    pub fn restore_session(&self, auth: &AuthApi) -> ApiResult<Option<LoginSession>> {
        let raw = match std::fs::read_to_string(&self.cache_path) {
            Ok(raw) => raw,
            Err(_) => return Ok(None),
        };

        let stored: StoredSession = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("会话缓存损坏，按未登录处理: {}", e);
                self.logout()?;
                return Ok(None);
            }
        };

        if !auth.verify_status(stored.user_id)? {
            tracing::info!(user_id = stored.user_id, "缓存会话对应账号已停用");
            self.logout()?;
            return Ok(None);
        }

        // 角色/资料可能在离线期间变更，以数据库为准重建会话
        let session = auth.login(&stored.username)?;
        self.set_current(Some(session.clone()))?;
        tracing::info!(user_id = session.user.id, "会话已恢复");
        Ok(Some(session))
    }

    /// 退出登录并清理缓存
    pub fn logout(&self) -> ApiResult<()> {
        if self.cache_path.exists() {
            std::fs::remove_file(&self.cache_path)
                .map_err(|e| ApiError::InternalError(format!("会话缓存清理失败: {}", e)))?;
        }
        self.set_current(None)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 账号状态轮询
// ==========================================

/// 账号存活探测（轮询数据源的抽象，便于测试替换）
#[async_trait]
pub trait AccountStatusProbe: Send + Sync {
    async fn is_account_active(&self, user_id: i64) -> Result<bool, String>;
}

#[async_trait]
impl AccountStatusProbe for AuthApi {
    async fn is_account_active(&self, user_id: i64) -> Result<bool, String> {
        self.verify_status(user_id).map_err(|e| e.to_string())
    }
}

/// 单次轮询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLiveness {
    Active,
    Deactivated,
}

/// SessionMonitor - 周期性核对当前账号是否仍然启用
pub struct SessionMonitor {
    probe: Arc<dyn AccountStatusProbe>,
    interval: Duration,
}

impl SessionMonitor {
    /// # 参数
    /// - probe: 状态探测实现（生产环境为 AuthApi）
    /// - interval_secs: 轮询间隔（见 ConfigManager::get_status_poll_interval_secs）
    pub fn new(probe: Arc<dyn AccountStatusProbe>, interval_secs: u64) -> Self {
        Self {
            probe,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// 单次探测；探测出错时保留会话（下个周期重试），不误踢用户
    pub async fn poll_once(&self, user_id: i64) -> SessionLiveness {
        match self.probe.is_account_active(user_id).await {
            Ok(true) => SessionLiveness::Active,
            Ok(false) => SessionLiveness::Deactivated,
            Err(e) => {
                tracing::warn!(user_id, "账号状态探测失败，保留会话: {}", e);
                SessionLiveness::Active
            }
        }
    }

    /// 持续轮询，账号被停用时返回
    pub async fn watch(&self, user_id: i64) -> SessionLiveness {
        let mut ticker = tokio::time::interval(self.interval);
        // 第一个 tick 立即触发
        loop {
            ticker.tick().await;
            if self.poll_once(user_id).await == SessionLiveness::Deactivated {
                tracing::info!(user_id, "账号已被停用，结束会话监控");
                return SessionLiveness::Deactivated;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 前 N 次返回启用，之后返回停用
    struct CountdownProbe {
        active_polls: usize,
        seen: AtomicUsize,
    }

    #[async_trait]
    impl AccountStatusProbe for CountdownProbe {
        async fn is_account_active(&self, _user_id: i64) -> Result<bool, String> {
            let n = self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(n < self.active_polls)
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl AccountStatusProbe for FailingProbe {
        async fn is_account_active(&self, _user_id: i64) -> Result<bool, String> {
            Err("网络不可达".to_string())
        }
    }

    #[tokio::test]
    async fn test_poll_once_reports_deactivation() {
        let probe = Arc::new(CountdownProbe {
            active_polls: 1,
            seen: AtomicUsize::new(0),
        });
        let monitor = SessionMonitor::new(probe, 1);

        assert_eq!(monitor.poll_once(7).await, SessionLiveness::Active);
        assert_eq!(monitor.poll_once(7).await, SessionLiveness::Deactivated);
    }

    #[tokio::test]
    async fn test_probe_error_keeps_session() {
        let monitor = SessionMonitor::new(Arc::new(FailingProbe), 1);
        assert_eq!(monitor.poll_once(7).await, SessionLiveness::Active);
    }
}
