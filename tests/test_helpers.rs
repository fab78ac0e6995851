// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的应用装配与基础目录数据
// ==========================================

use tempfile::NamedTempFile;

use inspection_qc::app::AppState;
use inspection_qc::domain::catalog::{NewPartNumber, NewUser};
use inspection_qc::domain::report::{
    InspectionEntryDraft, InspectionReportDraft, ReasonLineDraft,
};
use inspection_qc::CatalogKind;

/// 基础目录 id 集合（供报告草稿引用）
pub struct SeededCatalogs {
    pub shift_id: i64,
    pub inspector_id: i64,
    pub supervisor_id: i64,
    pub part_number_id: i64,
    pub defect_reason_id: i64,
    pub rework_reason_id: i64,
    pub shortfall_reason_id: i64,
}

/// 创建临时数据库上的完整 AppState
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - AppState: 已装配的应用状态
pub fn create_test_app() -> (NamedTempFile, AppState) {
    let temp_file = NamedTempFile::new().expect("无法创建临时数据库文件");
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let state = AppState::new(db_path).expect("无法初始化AppState");
    (temp_file, state)
}

/// 填充报告录入所需的最小目录数据
pub fn seed_catalogs(state: &AppState) -> SeededCatalogs {
    let catalog = &state.catalog_api;

    let shift_id = catalog.create_item(CatalogKind::Shift, "Turno A").unwrap();
    let inspector_id = catalog
        .create_item(CatalogKind::Inspector, "Laura Mendez")
        .unwrap();
    let supervisor_id = catalog
        .create_item(CatalogKind::SupervisorPerson, "Carlos Ruiz")
        .unwrap();
    let defect_reason_id = catalog
        .create_item(CatalogKind::DefectReason, "Rayadura")
        .unwrap();
    let rework_reason_id = catalog
        .create_item(CatalogKind::ReworkReason, "Limpieza")
        .unwrap();
    let shortfall_reason_id = catalog
        .create_item(CatalogKind::HourShortfallReason, "Falta de material")
        .unwrap();

    let part_number_id = catalog
        .create_part_number(&NewPartNumber {
            number: "PN-2001".to_string(),
            description: "Arnes principal".to_string(),
            platform: "T7".to_string(),
            supplier: "ACME".to_string(),
        })
        .unwrap();

    SeededCatalogs {
        shift_id,
        inspector_id,
        supervisor_id,
        part_number_id,
        defect_reason_id,
        rework_reason_id,
        shortfall_reason_id,
    }
}

/// 一份整班(08:00-16:00)、10 检 2 NOK、拒收对账齐平的可提交草稿
pub fn valid_draft(seed: &SeededCatalogs) -> InspectionReportDraft {
    InspectionReportDraft {
        date: chrono::NaiveDate::from_ymd_opt(2025, 3, 10),
        shift_id: Some(seed.shift_id),
        inspector_id: Some(seed.inspector_id),
        supervisor_id: Some(seed.supervisor_id),
        entries: vec![InspectionEntryDraft {
            part_number_id: Some(seed.part_number_id),
            lpn: "LPN-100".to_string(),
            lot: "LOT-9".to_string(),
            time_start: "08:00".to_string(),
            time_end: "16:00".to_string(),
            pieces_inspected: 10,
            pieces_not_ok: 2,
            rejection_items: vec![ReasonLineDraft::new(seed.defect_reason_id, 2)],
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// 创建一个启用状态的录入员账号，返回用户 id
pub fn seed_capturista(state: &AppState, username: &str) -> i64 {
    state
        .auth_api
        .create_user(&NewUser {
            name: "Ana Torres".to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            role_id: Some(3),
            role_text: "Capturista".to_string(),
        })
        .unwrap()
}
