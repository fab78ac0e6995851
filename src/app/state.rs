// ==========================================
// 质检报告系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::{AuthApi, CatalogApi, DashboardApi, ReportApi};
use crate::config::config_manager::ConfigManager;
use crate::domain::types::CatalogKind;
use crate::repository::{
    catalog_repo::CatalogRepository, part_number_repo::PartNumberRepository,
    report_repo::ReportRepository, user_repo::UserRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 认证与用户API
    pub auth_api: Arc<AuthApi>,

    /// 目录维护API
    pub catalog_api: Arc<CatalogApi>,

    /// 检验报告API
    pub report_api: Arc<ReportApi>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接并应用统一 PRAGMA
    /// 2. 初始化所有Repository（建表幂等）
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        // 九类通用目录共用同一仓储实现，按 CatalogKind 分表
        let mut catalog_repos: HashMap<CatalogKind, Arc<CatalogRepository>> = HashMap::new();
        for kind in CatalogKind::ALL {
            let repo = CatalogRepository::from_connection(conn.clone(), kind)
                .map_err(|e| format!("无法创建CatalogRepository({:?}): {}", kind, e))?;
            catalog_repos.insert(kind, Arc::new(repo));
        }

        let part_number_repo = Arc::new(
            PartNumberRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建PartNumberRepository: {}", e))?,
        );
        let user_repo = Arc::new(
            UserRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建UserRepository: {}", e))?,
        );
        let report_repo = Arc::new(
            ReportRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ReportRepository: {}", e))?,
        );

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================

        let auth_api = Arc::new(AuthApi::new(user_repo));
        let catalog_api = Arc::new(CatalogApi::new(catalog_repos, part_number_repo));
        let report_api = Arc::new(ReportApi::new(report_repo.clone(), config_manager.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(report_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            auth_api,
            catalog_api,
            report_api,
            dashboard_api,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/inspection-qc-dev/inspection_qc.db
/// - 生产环境: 用户数据目录/inspection-qc/inspection_qc.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("INSPECTION_QC_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖。
    let mut path = PathBuf::from("./inspection_qc.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("inspection-qc-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("inspection-qc");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("inspection_qc.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件
    // 这些测试应该在集成测试中进行
}
