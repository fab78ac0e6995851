// ==========================================
// 质检报告系统 - 认证与用户 API
// ==========================================
// 职责: 登录校验、角色归一化、路由判定、用户维护
// 说明: 凭据验证在身份提供方完成，这里只核对本地账号存在且启用；
//       登录即归一化角色，后续路由判定使用规范角色
// ==========================================

use serde::Serialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{NewUser, User};
use crate::domain::types::{Role, RouteDecision};
use crate::engine::route_access::{RoleResolver, RouteAccess};
use crate::i18n::t;
use crate::repository::user_repo::UserRepository;

/// 登录成功后的会话载荷: 会话标识 + 用户记录 + 归一化角色
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    pub session_id: String,
    pub user: User,
    pub role: Role,
}

// ==========================================
// AuthApi - 认证与用户 API
// ==========================================
pub struct AuthApi {
    user_repo: Arc<UserRepository>,
}

impl AuthApi {
    /// 创建新的AuthApi实例
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    // ==========================================
    // 登录与状态
    // ==========================================

    /// 登录: 账号存在且启用则放行，返回归一化角色
    pub fn login(&self, username: &str) -> ApiResult<LoginSession> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidInput(t("auth.invalid_credentials")));
        }

        let user = self
            .user_repo
            .find_by_username(username)?
            .ok_or_else(|| ApiError::InvalidInput(t("auth.invalid_credentials")))?;

        if !user.active {
            tracing::warn!(username = %username, "停用账号尝试登录");
            return Err(ApiError::AccountUnavailable(t("auth.user_inactive")));
        }

        let role = RoleResolver::resolve_user(&user);
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(user_id = user.id, %role, session_id = %session_id, "用户已登录");
        Ok(LoginSession {
            session_id,
            user,
            role,
        })
    }

    /// 账号是否仍然启用（会话轮询用，用户不存在视为停用）
    pub fn verify_status(&self, user_id: i64) -> ApiResult<bool> {
        Ok(self.user_repo.is_active(user_id)?)
    }

    /// 路由判定: (角色, 路径) → {allow, redirectTo}
    pub fn classify_route(&self, role: Role, path: &str) -> RouteDecision {
        RouteAccess::classify(role, path)
    }

    // ==========================================
    // 用户维护（仅管理员路由可达）
    // ==========================================

    pub fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.user_repo.list()?)
    }

    pub fn get_user(&self, id: i64) -> ApiResult<User> {
        self.user_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("User(id={})不存在", id)))
    }

    pub fn create_user(&self, payload: &NewUser) -> ApiResult<i64> {
        Self::check_user_payload(payload)?;
        let id = self.user_repo.create(payload)?;
        tracing::info!(user_id = id, username = %payload.username, "用户已创建");
        Ok(id)
    }

    pub fn update_user(&self, id: i64, payload: &NewUser) -> ApiResult<()> {
        Self::check_user_payload(payload)?;
        self.user_repo.update(id, payload)?;
        Ok(())
    }

    pub fn set_user_active(&self, id: i64, active: bool) -> ApiResult<()> {
        self.user_repo.set_active(id, active)?;
        tracing::info!(user_id = id, active, "用户启用状态已变更");
        Ok(())
    }

    pub fn delete_user(&self, id: i64) -> ApiResult<()> {
        Ok(self.user_repo.delete(id)?)
    }

    fn check_user_payload(payload: &NewUser) -> ApiResult<()> {
        if payload.username.trim().is_empty() {
            return Err(ApiError::InvalidInput("登录名不能为空".to_string()));
        }
        if payload.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("姓名不能为空".to_string()));
        }
        Ok(())
    }
}
