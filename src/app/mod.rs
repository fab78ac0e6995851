// ==========================================
// 质检报告系统 - 应用层
// ==========================================
// 职责: 应用状态装配与会话管理
// ==========================================

pub mod session;
pub mod state;

pub use session::{AccountStatusProbe, SessionLiveness, SessionMonitor, SessionStore};
pub use state::{get_default_db_path, AppState};
