// ==========================================
// 认证/会话集成测试
// ==========================================
// 覆盖: 登录、角色归一化+路由判定、会话持久化与恢复、状态轮询
// ==========================================

mod test_helpers;

use inspection_qc::api::ApiError;
use inspection_qc::app::{SessionLiveness, SessionMonitor, SessionStore};
use inspection_qc::domain::catalog::NewUser;
use inspection_qc::Role;
use test_helpers::{create_test_app, seed_capturista};

#[test]
fn test_login_resolves_role_and_routes() {
    let (_db, state) = create_test_app();
    seed_capturista(&state, "atorres");

    let session = state.auth_api.login("atorres").unwrap();
    assert_eq!(session.role, Role::Capturista);
    assert!(!session.session_id.is_empty());

    // 录入员: 目录可达，用户管理不可达
    assert!(state
        .auth_api
        .classify_route(session.role, "/catalogs/defects")
        .allow);
    let decision = state.auth_api.classify_route(session.role, "/users");
    assert!(!decision.allow);
    assert_eq!(decision.redirect_to.as_deref(), Some("/dashboard"));
}

#[test]
fn test_login_rejections() {
    let (_db, state) = create_test_app();
    let user_id = seed_capturista(&state, "atorres");

    // 未知账号
    let err = state.auth_api.login("nadie").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // 停用账号
    state.auth_api.set_user_active(user_id, false).unwrap();
    let err = state.auth_api.login("atorres").unwrap_err();
    assert!(matches!(err, ApiError::AccountUnavailable(_)));
}

#[test]
fn test_session_persist_and_restore() {
    let (_db, state) = create_test_app();
    seed_capturista(&state, "atorres");

    let cache = tempfile::NamedTempFile::new().unwrap();
    let cache_path = cache.path().to_path_buf();
    drop(cache); // 只要路径，登录时重建文件

    let store = SessionStore::with_cache_path(&cache_path);
    store.login(&state.auth_api, "atorres").unwrap();
    assert!(store.current_user().is_some());

    // 模拟重启: 新的 store 从缓存恢复
    let restored_store = SessionStore::with_cache_path(&cache_path);
    let restored = restored_store.restore_session(&state.auth_api).unwrap();
    assert_eq!(restored.unwrap().user.username, "atorres");

    // 退出后缓存清空，无法再恢复
    restored_store.logout().unwrap();
    let store3 = SessionStore::with_cache_path(&cache_path);
    assert!(store3.restore_session(&state.auth_api).unwrap().is_none());
}

#[test]
fn test_restore_rejects_deactivated_account() {
    let (_db, state) = create_test_app();
    let user_id = seed_capturista(&state, "atorres");

    let cache = tempfile::NamedTempFile::new().unwrap();
    let store = SessionStore::with_cache_path(cache.path());
    store.login(&state.auth_api, "atorres").unwrap();

    // 离线期间管理员停用账号
    state.auth_api.set_user_active(user_id, false).unwrap();

    let restored = SessionStore::with_cache_path(cache.path());
    assert!(restored.restore_session(&state.auth_api).unwrap().is_none());
}

#[test]
fn test_role_change_picked_up_on_restore() {
    let (_db, state) = create_test_app();
    let user_id = seed_capturista(&state, "atorres");

    let cache = tempfile::NamedTempFile::new().unwrap();
    let store = SessionStore::with_cache_path(cache.path());
    let session = store.login(&state.auth_api, "atorres").unwrap();
    assert_eq!(session.role, Role::Capturista);

    // 离线期间晋升为管理员，恢复会话以数据库为准
    state
        .auth_api
        .update_user(
            user_id,
            &NewUser {
                name: "Ana Torres".to_string(),
                username: "atorres".to_string(),
                email: "atorres@example.com".to_string(),
                role_id: Some(1),
                role_text: "Administrador".to_string(),
            },
        )
        .unwrap();

    let restored = SessionStore::with_cache_path(cache.path());
    let session = restored.restore_session(&state.auth_api).unwrap().unwrap();
    assert_eq!(session.role, Role::Administrator);
}

#[tokio::test]
async fn test_monitor_detects_deactivation() {
    let (_db, state) = create_test_app();
    let user_id = seed_capturista(&state, "atorres");

    let monitor = SessionMonitor::new(state.auth_api.clone(), 1);
    assert_eq!(monitor.poll_once(user_id).await, SessionLiveness::Active);

    state.auth_api.set_user_active(user_id, false).unwrap();
    assert_eq!(monitor.poll_once(user_id).await, SessionLiveness::Deactivated);

    // 不存在的用户视为停用
    assert_eq!(monitor.poll_once(9999).await, SessionLiveness::Deactivated);
}
