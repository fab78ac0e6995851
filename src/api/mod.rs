// ==========================================
// 质检报告系统 - API 层
// ==========================================
// 职责: 面向前端的业务接口（认证/目录/报告/看板）
// 架构: API 层 → 引擎层(纯函数) + 仓储层(SQLite)
// ==========================================

pub mod auth_api;
pub mod catalog_api;
pub mod dashboard_api;
pub mod error;
pub mod report_api;

// 重导出
pub use auth_api::{AuthApi, LoginSession};
pub use catalog_api::CatalogApi;
pub use dashboard_api::{DashboardApi, DashboardSnapshot};
pub use error::{ApiError, ApiResult};
pub use report_api::{ReportApi, SubmitResult};
