// ==========================================
// 质检报告系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 质检数据录入与报告
// ==========================================

use inspection_qc::app::{get_default_db_path, AppState, SessionStore};

#[tokio::main]
async fn main() {
    // 初始化日志系统
    inspection_qc::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", inspection_qc::APP_NAME);
    tracing::info!("系统版本: {}", inspection_qc::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("AppState初始化成功");

    // 按配置设置界面语言
    match app_state.config_manager.get_default_locale() {
        Ok(locale) => inspection_qc::i18n::set_locale(&locale),
        Err(e) => tracing::warn!("读取默认语言失败，使用 zh-CN: {}", e),
    }

    // 恢复上次会话
    let session_store = SessionStore::new();
    match session_store.restore_session(&app_state.auth_api) {
        Ok(Some(session)) => {
            tracing::info!(
                user_id = session.user.id,
                role = %session.role,
                "已恢复上次登录会话"
            );
        }
        Ok(None) => tracing::info!("无可恢复的登录会话"),
        Err(e) => tracing::warn!("会话恢复失败: {}", e),
    }

    tracing::info!("初始化完成，等待前端接入");
}
