// ==========================================
// 质检报告系统 - 引擎层
// ==========================================
// 职责: 业务规则的纯逻辑（派生、校验、路由判定）
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

pub mod derivation_core;
pub mod report_validator;
pub mod route_access;

// 重导出
pub use derivation_core::DerivationCore;
pub use report_validator::ReportValidator;
pub use route_access::{RoleResolver, RouteAccess};
