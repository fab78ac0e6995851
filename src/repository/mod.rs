// ==========================================
// 质检报告系统 - 数据仓储层
// ==========================================
// 职责: SQLite 数据访问（目录、用户、报告）
// 红线: 不含业务规则；引擎/API 层通过仓储操作数据库
// ==========================================

pub mod catalog_repo;
pub mod error;
pub mod part_number_repo;
pub mod report_repo;
pub mod user_repo;

// 重导出
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use part_number_repo::PartNumberRepository;
pub use report_repo::ReportRepository;
pub use user_repo::UserRepository;
