// ==========================================
// 质检报告系统 - 检验报告 API
// ==========================================
// 职责: 报告提交/更新/查询/删除
// 提交管线（固定顺序）:
//   1. DerivationCore::recompute_report 重算全部派生字段（不信任表单值）
//   2. ReportValidator::validate 同步校验，首个失败即返回描述符
//   3. 通过后整棵聚合树事务化落库
// 说明: 校验失败不是 ApiError，由 SubmitResult 携带描述符返回给表单
// ==========================================

use serde::Serialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::report::{InspectionReportDraft, ReportDetail, ReportSummary};
use crate::engine::derivation_core::DerivationCore;
use crate::engine::report_validator::{ReportValidator, ValidationFailure, ValidationOutcome};
use crate::repository::report_repo::ReportRepository;

// ==========================================
// SubmitResult - 提交结果
// ==========================================

/// 提交结果: 成功带报告 id，失败带首个校验失败描述符
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ValidationFailure>,
}

impl SubmitResult {
    fn saved(report_id: i64) -> Self {
        Self {
            ok: true,
            report_id: Some(report_id),
            failure: None,
        }
    }

    fn rejected(failure: ValidationFailure) -> Self {
        Self {
            ok: false,
            report_id: None,
            failure: Some(failure),
        }
    }
}

// ==========================================
// ReportApi - 检验报告 API
// ==========================================
pub struct ReportApi {
    report_repo: Arc<ReportRepository>,
    config: Arc<ConfigManager>,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(report_repo: Arc<ReportRepository>, config: Arc<ConfigManager>) -> Self {
        Self {
            report_repo,
            config,
        }
    }

    fn full_shift_hours(&self) -> ApiResult<f64> {
        self.config
            .get_full_shift_hours()
            .map_err(|e| ApiError::InternalError(format!("读取满班时数配置失败: {}", e)))
    }

    /// 表单实时校验: 重算派生字段并返回 {ok, ...} 结构
    ///
    /// 调用方在每次字段编辑后重跑，draft 中的派生字段会被覆写
    pub fn validate_draft(&self, draft: &mut InspectionReportDraft) -> ApiResult<ValidationOutcome> {
        let full_shift_hours = self.full_shift_hours()?;
        DerivationCore::recompute_report(draft, full_shift_hours);
        Ok(ReportValidator::check(draft, full_shift_hours))
    }

    /// 提交新报告
    pub fn submit_report(&self, mut draft: InspectionReportDraft) -> ApiResult<SubmitResult> {
        let full_shift_hours = self.full_shift_hours()?;
        DerivationCore::recompute_report(&mut draft, full_shift_hours);

        if let Err(failure) = ReportValidator::validate(&draft, full_shift_hours) {
            tracing::info!(
                code = ?failure.code,
                entry_index = ?failure.entry_index,
                "报告提交被校验拒绝"
            );
            return Ok(SubmitResult::rejected(failure));
        }

        let report_id = self.report_repo.insert_report(&draft)?;
        tracing::info!(
            report_id,
            entries = draft.entries.len(),
            hours_worked = draft.hours_worked,
            "报告已提交"
        );
        Ok(SubmitResult::saved(report_id))
    }

    /// 重新提交既有报告（编辑页保存）: 同一套重算+校验管线
    pub fn resubmit_report(
        &self,
        id: i64,
        mut draft: InspectionReportDraft,
    ) -> ApiResult<SubmitResult> {
        let full_shift_hours = self.full_shift_hours()?;
        DerivationCore::recompute_report(&mut draft, full_shift_hours);

        if let Err(failure) = ReportValidator::validate(&draft, full_shift_hours) {
            tracing::info!(
                report_id = id,
                code = ?failure.code,
                "报告更新被校验拒绝"
            );
            return Ok(SubmitResult::rejected(failure));
        }

        self.report_repo.update_report(id, &draft)?;
        tracing::info!(report_id = id, "报告已更新");
        Ok(SubmitResult::saved(id))
    }

    pub fn get_report(&self, id: i64) -> ApiResult<ReportDetail> {
        self.report_repo
            .find_detail(id)?
            .ok_or_else(|| ApiError::NotFound(format!("InspectionReport(id={})不存在", id)))
    }

    pub fn list_reports(&self) -> ApiResult<Vec<ReportSummary>> {
        Ok(self.report_repo.list_summaries()?)
    }

    pub fn delete_report(&self, id: i64) -> ApiResult<()> {
        self.report_repo.delete_report(id)?;
        tracing::info!(report_id = id, "报告已删除");
        Ok(())
    }
}
