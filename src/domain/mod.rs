// ==========================================
// 质检报告系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、服务边界的显式记录
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod report;
pub mod types;

// 重导出核心类型
pub use catalog::{CatalogItem, NewPartNumber, NewUser, PartNumber, User};
pub use report::{
    DefectParetoSlice, EntryDetail, InspectionEntryDraft, InspectionReportDraft, OkNokDaily,
    ReasonLineDetail, ReasonLineDraft, ReportDetail, ReportSummary,
};
pub use types::{CatalogKind, LineKind, Role, RouteDecision};
