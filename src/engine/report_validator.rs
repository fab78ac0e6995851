// ==========================================
// 质检报告系统 - 报告提交校验器
// ==========================================
// 职责: 提交前对报告快照做同步纯校验，返回首个失败规则的描述符
// 红线: 无副作用、无 I/O；调用方负责在每次字段编辑后与提交前重跑
// 校验顺序（固定）:
//   1. 班次/检验员/主管齐全
//   2. 至少一条检验记录
//   3. 逐条: 零件号/起止时间齐全，检验数>0
//   4. 逐条: 规则A(拒收核对NOK) → 规则B(返工核对申报合计) → 明细行完整性
//   5. 工时>=8 或 已启用且填写不足时数原因
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::report::{InspectionEntryDraft, InspectionReportDraft, ReasonLineDraft};
use crate::i18n::{t, t_with_args};

// ==========================================
// 校验结果描述符
// ==========================================

/// 失败规则代码（与消息分离，便于前端按代码分支）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    HeaderIncomplete,
    NoEntries,
    EntryFieldMissing,
    PiecesZero,
    RejectionMissing,
    RejectionMismatch,
    ReworkMissing,
    ReworkMismatch,
    ReworkLineIncomplete,
    RejectionLineIncomplete,
    HoursShortfall,
}

/// 首个失败规则的描述符
///
/// entry_index 为 1 基（与表单"检验 #N"一致）；报告级失败时为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub code: ValidationCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ValidationFailure {
    fn report_level(code: ValidationCode, field: Option<&str>, message: String) -> Self {
        Self {
            code,
            entry_index: None,
            field: field.map(str::to_string),
            message,
        }
    }

    fn entry_level(
        code: ValidationCode,
        entry_index: usize,
        field: Option<&str>,
        message: String,
    ) -> Self {
        Self {
            code,
            entry_index: Some(entry_index),
            field: field.map(str::to_string),
            message,
        }
    }
}

/// 表单层的校验输出: { ok: true } 或 { ok: false, ...描述符 }
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub ok: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ValidationFailure>,
}

impl ValidationOutcome {
    pub fn passed() -> Self {
        Self {
            ok: true,
            failure: None,
        }
    }

    pub fn failed(failure: ValidationFailure) -> Self {
        Self {
            ok: false,
            failure: Some(failure),
        }
    }
}

// ==========================================
// ReportValidator - 提交校验器（纯函数）
// ==========================================
pub struct ReportValidator;

impl ReportValidator {
    /// 校验报告快照，返回首个失败
    ///
    /// # 参数
    /// - report: 派生字段已重算的表单快照（见 DerivationCore::recompute_report）
    /// - full_shift_hours: 标准班次时长（通常 8.0）
    pub fn validate(
        report: &InspectionReportDraft,
        full_shift_hours: f64,
    ) -> Result<(), ValidationFailure> {
        // 1. 报告头
        Self::check_header(report)?;

        // 2. 非空记录
        if report.entries.is_empty() {
            return Err(ValidationFailure::report_level(
                ValidationCode::NoEntries,
                Some("entries"),
                t("validator.no_entries"),
            ));
        }

        // 3. 逐条必填字段
        for (i, entry) in report.entries.iter().enumerate() {
            Self::check_entry_fields(entry, i + 1)?;
        }

        // 4. 逐条数量核对（规则A/规则B/明细完整性）
        for (i, entry) in report.entries.iter().enumerate() {
            Self::check_entry_reconciliation(entry, i + 1)?;
        }

        // 5. 工时门槛
        Self::check_hours(report, full_shift_hours)?;

        Ok(())
    }

    /// 表单层便捷封装: 返回 {ok, ...} 结构
    pub fn check(report: &InspectionReportDraft, full_shift_hours: f64) -> ValidationOutcome {
        match Self::validate(report, full_shift_hours) {
            Ok(()) => ValidationOutcome::passed(),
            Err(failure) => ValidationOutcome::failed(failure),
        }
    }

    fn check_header(report: &InspectionReportDraft) -> Result<(), ValidationFailure> {
        let missing = if report.shift_id.is_none() {
            Some("shiftId")
        } else if report.inspector_id.is_none() {
            Some("inspectorId")
        } else if report.supervisor_id.is_none() {
            Some("supervisorId")
        } else {
            None
        };

        match missing {
            Some(field) => Err(ValidationFailure::report_level(
                ValidationCode::HeaderIncomplete,
                Some(field),
                t("validator.header_incomplete"),
            )),
            None => Ok(()),
        }
    }

    fn check_entry_fields(
        entry: &InspectionEntryDraft,
        index: usize,
    ) -> Result<(), ValidationFailure> {
        let missing = if entry.part_number_id.is_none() {
            Some("partNumberId")
        } else if entry.time_start.trim().is_empty() {
            Some("timeStart")
        } else if entry.time_end.trim().is_empty() {
            Some("timeEnd")
        } else {
            None
        };

        if let Some(field) = missing {
            let idx = index.to_string();
            return Err(ValidationFailure::entry_level(
                ValidationCode::EntryFieldMissing,
                index,
                Some(field),
                t_with_args(
                    "validator.entry_field_missing",
                    &[("index", &idx), ("field", field)],
                ),
            ));
        }

        if entry.pieces_inspected == 0 {
            let idx = index.to_string();
            return Err(ValidationFailure::entry_level(
                ValidationCode::PiecesZero,
                index,
                Some("piecesInspected"),
                t_with_args("validator.pieces_zero", &[("index", &idx)]),
            ));
        }

        Ok(())
    }

    fn check_entry_reconciliation(
        entry: &InspectionEntryDraft,
        index: usize,
    ) -> Result<(), ValidationFailure> {
        let idx = index.to_string();
        let rejection_total: u32 = entry.rejection_items.iter().map(|l| l.quantity).sum();
        let rework_total: u32 = entry.rework_items.iter().map(|l| l.quantity).sum();

        // 规则A: 拒收覆盖 NOK（存在 NOK 必须有拒收明细，且合计精确相等）
        if entry.pieces_not_ok > 0 {
            if rejection_total == 0 {
                return Err(ValidationFailure::entry_level(
                    ValidationCode::RejectionMissing,
                    index,
                    Some("rejectionItems"),
                    t_with_args("validator.rejection_missing", &[("index", &idx)]),
                ));
            }
            if rejection_total != entry.pieces_not_ok {
                return Err(ValidationFailure::entry_level(
                    ValidationCode::RejectionMismatch,
                    index,
                    Some("rejectionItems"),
                    t_with_args(
                        "validator.rejection_mismatch",
                        &[
                            ("index", &idx),
                            ("expected", &entry.pieces_not_ok.to_string()),
                            ("actual", &rejection_total.to_string()),
                        ],
                    ),
                ));
            }
        }

        // 规则B: 返工核对独立的申报合计（与 NOK 无关的独立轴）
        if entry.declared_rework_total > 0 {
            if rework_total == 0 {
                return Err(ValidationFailure::entry_level(
                    ValidationCode::ReworkMissing,
                    index,
                    Some("reworkItems"),
                    t_with_args(
                        "validator.rework_missing",
                        &[
                            ("index", &idx),
                            ("declared", &entry.declared_rework_total.to_string()),
                        ],
                    ),
                ));
            }
            if rework_total != entry.declared_rework_total {
                return Err(ValidationFailure::entry_level(
                    ValidationCode::ReworkMismatch,
                    index,
                    Some("reworkItems"),
                    t_with_args(
                        "validator.rework_mismatch",
                        &[
                            ("index", &idx),
                            ("declared", &entry.declared_rework_total.to_string()),
                            ("actual", &rework_total.to_string()),
                        ],
                    ),
                ));
            }
        }

        // 明细行完整性: 每行需已选原因且数量>0
        if Self::has_incomplete_line(&entry.rework_items) {
            return Err(ValidationFailure::entry_level(
                ValidationCode::ReworkLineIncomplete,
                index,
                Some("reworkItems"),
                t_with_args("validator.rework_line_incomplete", &[("index", &idx)]),
            ));
        }
        if Self::has_incomplete_line(&entry.rejection_items) {
            return Err(ValidationFailure::entry_level(
                ValidationCode::RejectionLineIncomplete,
                index,
                Some("rejectionItems"),
                t_with_args("validator.rejection_line_incomplete", &[("index", &idx)]),
            ));
        }

        Ok(())
    }

    fn has_incomplete_line(lines: &[ReasonLineDraft]) -> bool {
        lines.iter().any(|l| !l.is_complete())
    }

    fn check_hours(
        report: &InspectionReportDraft,
        full_shift_hours: f64,
    ) -> Result<(), ValidationFailure> {
        if report.hours_worked >= full_shift_hours {
            return Ok(());
        }

        // 例外: 调用方启用了不足时数勾选且已选原因
        if report.override_enabled && report.no_hours_override_reason.is_some() {
            return Ok(());
        }

        Err(ValidationFailure::report_level(
            ValidationCode::HoursShortfall,
            Some("hoursWorked"),
            t_with_args(
                "validator.hours_shortfall",
                &[
                    ("hours", &format!("{:.2}", report.hours_worked)),
                    ("required", &format!("{}", full_shift_hours)),
                ],
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::derivation_core::DerivationCore;

    /// 一条可通过全部校验的记录: 8 小时，10 检验 2 NOK，拒收 2
    fn valid_entry() -> InspectionEntryDraft {
        InspectionEntryDraft {
            part_number_id: Some(1),
            time_start: "08:00".to_string(),
            time_end: "16:00".to_string(),
            pieces_inspected: 10,
            pieces_not_ok: 2,
            rejection_items: vec![ReasonLineDraft::new(7, 2)],
            ..Default::default()
        }
    }

    fn valid_report() -> InspectionReportDraft {
        let mut report = InspectionReportDraft {
            shift_id: Some(1),
            inspector_id: Some(1),
            supervisor_id: Some(1),
            entries: vec![valid_entry()],
            ..Default::default()
        };
        DerivationCore::recompute_report(&mut report, 8.0);
        report
    }

    #[test]
    fn test_valid_report_passes() {
        let report = valid_report();
        assert!(ReportValidator::validate(&report, 8.0).is_ok());
        assert!(ReportValidator::check(&report, 8.0).ok);
    }

    #[test]
    fn test_missing_header_fails_first() {
        let mut report = valid_report();
        report.inspector_id = None;
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::HeaderIncomplete);
        assert_eq!(failure.field.as_deref(), Some("inspectorId"));
        assert_eq!(failure.entry_index, None);
    }

    #[test]
    fn test_empty_entries_never_valid() {
        let mut report = valid_report();
        report.entries.clear();
        DerivationCore::recompute_report(&mut report, 8.0);
        // 即使补上不足时数原因，空报告仍不可提交
        report.override_enabled = true;
        report.no_hours_override_reason = Some(1);
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::NoEntries);
    }

    #[test]
    fn test_missing_part_number_names_entry() {
        let mut report = valid_report();
        report.entries.push(InspectionEntryDraft {
            time_start: "08:00".to_string(),
            time_end: "09:00".to_string(),
            pieces_inspected: 1,
            ..Default::default()
        });
        DerivationCore::recompute_report(&mut report, 8.0);
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::EntryFieldMissing);
        assert_eq!(failure.entry_index, Some(2));
        assert_eq!(failure.field.as_deref(), Some("partNumberId"));
    }

    #[test]
    fn test_rule_a_zero_rejections_distinct_from_mismatch() {
        // NOK>0 但无拒收明细
        let mut report = valid_report();
        report.entries[0].rejection_items.clear();
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::RejectionMissing);

        // 有明细但合计不等
        let mut report = valid_report();
        report.entries[0].rejection_items = vec![ReasonLineDraft::new(7, 1)];
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::RejectionMismatch);
        assert_eq!(failure.entry_index, Some(1));
    }

    #[test]
    fn test_rule_a_exact_match_passes() {
        let mut report = valid_report();
        report.entries[0].rejection_items =
            vec![ReasonLineDraft::new(7, 1), ReasonLineDraft::new(8, 1)];
        assert!(ReportValidator::validate(&report, 8.0).is_ok());
    }

    #[test]
    fn test_rule_b_declared_rework_total() {
        // 申报了合计但无返工明细
        let mut report = valid_report();
        report.entries[0].declared_rework_total = 3;
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::ReworkMissing);

        // 合计不等
        report.entries[0].rework_items = vec![ReasonLineDraft::new(4, 2)];
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::ReworkMismatch);

        // 精确相等通过
        report.entries[0].rework_items = vec![ReasonLineDraft::new(4, 3)];
        assert!(ReportValidator::validate(&report, 8.0).is_ok());
    }

    #[test]
    fn test_rework_independent_of_nok() {
        // NOK=0 也可以有返工（独立轴），只要申报合计对得上
        let mut report = valid_report();
        report.entries[0].pieces_not_ok = 0;
        report.entries[0].rejection_items.clear();
        report.entries[0].declared_rework_total = 2;
        report.entries[0].rework_items = vec![ReasonLineDraft::new(4, 2)];
        DerivationCore::recompute_report(&mut report, 8.0);
        assert!(ReportValidator::validate(&report, 8.0).is_ok());
    }

    #[test]
    fn test_incomplete_line_names_kind_and_entry() {
        let mut report = valid_report();
        // 数量为 0 的拒收行: 合计仍等于 NOK(2)，规则A通过，完整性兜底
        report.entries[0]
            .rejection_items
            .push(ReasonLineDraft::new(9, 0));
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::RejectionLineIncomplete);
        assert_eq!(failure.entry_index, Some(1));

        // 未选原因的返工行
        let mut report = valid_report();
        report.entries[0].declared_rework_total = 2;
        report.entries[0].rework_items = vec![ReasonLineDraft {
            reason_id: None,
            quantity: 2,
        }];
        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::ReworkLineIncomplete);
    }

    #[test]
    fn test_hours_shortfall_blocked_without_override() {
        let mut report = valid_report();
        report.entries[0].time_end = "15:30".to_string(); // 7.5 小时
        DerivationCore::recompute_report(&mut report, 8.0);
        assert_eq!(report.hours_worked, 7.5);

        let failure = ReportValidator::validate(&report, 8.0).unwrap_err();
        assert_eq!(failure.code, ValidationCode::HoursShortfall);
        assert!(failure.message.contains("7.50"));
        assert!(failure.message.contains("8"));
    }

    #[test]
    fn test_hours_shortfall_message_uses_configured_threshold() {
        // 门槛可配置（见 config_keys::FULL_SHIFT_HOURS），消息不得写死 8
        let mut report = valid_report();
        report.entries[0].time_end = "15:00".to_string(); // 7 小时
        DerivationCore::recompute_report(&mut report, 7.5);

        let failure = ReportValidator::validate(&report, 7.5).unwrap_err();
        assert_eq!(failure.code, ValidationCode::HoursShortfall);
        assert!(failure.message.contains("7.00"));
        assert!(failure.message.contains("7.5"));

        // 7.5 门槛下同一报告 8 小时整班不受影响
        report.entries[0].time_end = "16:00".to_string();
        DerivationCore::recompute_report(&mut report, 7.5);
        assert!(ReportValidator::validate(&report, 7.5).is_ok());
    }

    #[test]
    fn test_hours_shortfall_override_proceeds() {
        let mut report = valid_report();
        report.entries[0].time_end = "15:30".to_string();
        DerivationCore::recompute_report(&mut report, 8.0);

        // 仅启用勾选但未选原因 → 仍阻止
        report.override_enabled = true;
        assert!(ReportValidator::validate(&report, 8.0).is_err());

        // 勾选 + 原因 → 放行进入其余检查
        report.no_hours_override_reason = Some(2);
        assert!(ReportValidator::validate(&report, 8.0).is_ok());
    }
}
