// ==========================================
// 质检报告系统 - 角色归一与路由判定
// ==========================================
// 职责: (原始角色, 请求路径) → {allow, redirectTo} 的纯函数
// 规则:
//   - 数值 id_rol 查固定表优先；否则按角色文本前缀匹配；都失败默认主管
//   - 管理员绕过全部限制；主管限于白名单；其余角色按路由-角色表
//   - 不匹配时统一跳转看板
// ==========================================

use crate::domain::catalog::User;
use crate::domain::types::{Role, RouteDecision};

/// 拒绝时的统一跳转目标
pub const DEFAULT_REDIRECT: &str = "/dashboard";

/// 主管可访问的路由白名单（尾部 /* 表示前缀匹配）
const SUPERVISOR_ALLOWED: &[&str] = &["/dashboard", "/reports", "/reports/*"];

/// 路由-角色表（管理员/主管之外的角色按此兜底）
///
/// 目录维护路由对录入员开放；用户管理仅管理员。
const ROUTE_RULES: &[(&str, &[Role])] = &[
    ("/dashboard", &[Role::Supervisor, Role::Capturista]),
    ("/reports", &[Role::Supervisor, Role::Capturista]),
    ("/reports/*", &[Role::Supervisor, Role::Capturista]),
    ("/catalogs/*", &[Role::Capturista]),
    ("/users", &[]),
    ("/users/*", &[]),
];

// ==========================================
// RoleResolver - 规范角色归一化
// ==========================================
pub struct RoleResolver;

impl RoleResolver {
    /// 归一化原始角色
    ///
    /// # 规则（优先级从高到低）
    /// 1. id_rol 固定表: "1"→管理员, "2"→主管, "3"→录入员
    /// 2. 角色文本前缀: admin*→管理员, super*→主管, captur*→录入员（忽略大小写）
    /// 3. 默认主管
    pub fn resolve(role_id: Option<&str>, role_text: Option<&str>) -> Role {
        if let Some(id) = role_id {
            match id.trim() {
                "1" => return Role::Administrator,
                "2" => return Role::Supervisor,
                "3" => return Role::Capturista,
                _ => {}
            }
        }

        if let Some(text) = role_text {
            let normalized = text.trim().to_lowercase();
            if normalized.starts_with("admin") {
                return Role::Administrator;
            }
            if normalized.starts_with("super") {
                return Role::Supervisor;
            }
            if normalized.starts_with("captur") {
                return Role::Capturista;
            }
        }

        Role::Supervisor
    }

    /// 从用户记录归一化
    pub fn resolve_user(user: &User) -> Role {
        let id = user.role_id.map(|v| v.to_string());
        Self::resolve(id.as_deref(), Some(&user.role_text))
    }
}

// ==========================================
// RouteAccess - 路由判定（纯函数）
// ==========================================
pub struct RouteAccess;

impl RouteAccess {
    /// 判定角色对路径的访问
    pub fn classify(role: Role, path: &str) -> RouteDecision {
        // 管理员绕过全部限制
        if role == Role::Administrator {
            return RouteDecision::allow();
        }

        // 主管: 显式白名单
        if role == Role::Supervisor {
            let allowed = SUPERVISOR_ALLOWED
                .iter()
                .any(|pattern| Self::matches(pattern, path));
            return if allowed {
                RouteDecision::allow()
            } else {
                RouteDecision::redirect(DEFAULT_REDIRECT)
            };
        }

        // 其余角色: 路由-角色表兜底，未命中一律跳转看板
        for (pattern, roles) in ROUTE_RULES {
            if Self::matches(pattern, path) {
                return if roles.contains(&role) {
                    RouteDecision::allow()
                } else {
                    RouteDecision::redirect(DEFAULT_REDIRECT)
                };
            }
        }

        RouteDecision::redirect(DEFAULT_REDIRECT)
    }

    /// 路由模式匹配: 尾部 "/*" 为前缀匹配，否则精确匹配
    fn matches(pattern: &str, path: &str) -> bool {
        match pattern.strip_suffix("/*") {
            Some(prefix) => path == prefix || path.starts_with(&format!("{}/", prefix)),
            None => path == pattern,
        }
    }
}
