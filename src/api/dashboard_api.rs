// ==========================================
// 质检报告系统 - 看板 API
// ==========================================
// 职责: 看板聚合查询（按日 OK/NOK 走势、缺陷帕累托、区间合计）
// 说明: 只做数据聚合，不含渲染
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::report::{DefectParetoSlice, OkNokDaily};
use crate::repository::report_repo::ReportRepository;

/// 看板一次性快照: 走势 + 帕累托 + 区间合计
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub daily: Vec<OkNokDaily>,
    pub defect_pareto: Vec<DefectParetoSlice>,
    pub total_ok: i64,
    pub total_not_ok: i64,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    report_repo: Arc<ReportRepository>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    pub fn new(report_repo: Arc<ReportRepository>) -> Self {
        Self { report_repo }
    }

    fn check_range(from: NaiveDate, to: NaiveDate) -> ApiResult<()> {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "日期区间无效: {} > {}",
                from, to
            )));
        }
        Ok(())
    }

    /// 区间内按日 OK/NOK 合计
    pub fn ok_nok_by_date(&self, from: NaiveDate, to: NaiveDate) -> ApiResult<Vec<OkNokDaily>> {
        Self::check_range(from, to)?;
        Ok(self.report_repo.ok_nok_by_date(from, to)?)
    }

    /// 区间内缺陷帕累托（按拒收数量降序）
    pub fn defect_pareto(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<DefectParetoSlice>> {
        Self::check_range(from, to)?;
        Ok(self.report_repo.defect_pareto(from, to)?)
    }

    /// 看板页一次性快照
    pub fn snapshot(&self, from: NaiveDate, to: NaiveDate) -> ApiResult<DashboardSnapshot> {
        Self::check_range(from, to)?;
        let daily = self.report_repo.ok_nok_by_date(from, to)?;
        let defect_pareto = self.report_repo.defect_pareto(from, to)?;
        let total_ok = daily.iter().map(|d| d.pieces_ok).sum();
        let total_not_ok = daily.iter().map(|d| d.pieces_not_ok).sum();

        Ok(DashboardSnapshot {
            from,
            to,
            daily,
            defect_pareto,
            total_ok,
            total_not_ok,
        })
    }
}
