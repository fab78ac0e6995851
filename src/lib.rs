// ==========================================
// 质检报告系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 质检数据录入与报告（检验记录、目录维护、看板聚合）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（纯函数）
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态与会话
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CatalogKind, LineKind, Role, RouteDecision};

// 领域实体
pub use domain::{
    CatalogItem, InspectionEntryDraft, InspectionReportDraft, PartNumber, ReasonLineDraft,
    ReportDetail, ReportSummary, User,
};

// 引擎
pub use engine::{DerivationCore, ReportValidator, RoleResolver, RouteAccess};
pub use engine::report_validator::{ValidationCode, ValidationFailure, ValidationOutcome};

// API
pub use api::{AuthApi, CatalogApi, DashboardApi, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "质检报告系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// 标准班次时长（小时），低于该值需填写不足时数原因
pub const FULL_SHIFT_HOURS: f64 = 8.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
