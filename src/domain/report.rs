// ==========================================
// 质检报告系统 - 检验报告实体
// ==========================================
// 职责: 报告聚合根的表单快照（Draft）与持久化读模型（Summary/Detail）
// 约定: 表单层载荷使用 camelCase，与前端字段一致
// 派生字段(pieces_ok/minutes_worked/hours_worked/overtime_hours)只由
// DerivationCore 重算，禁止直接录入
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::LineKind;

// ==========================================
// 表单快照（校验输入）
// ==========================================

/// 返工/拒收明细行（表单态）
///
/// reason_id 未选择时为 None；quantity 默认 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonLineDraft {
    #[serde(default)]
    pub reason_id: Option<i64>,
    #[serde(default)]
    pub quantity: u32,
}

impl ReasonLineDraft {
    pub fn new(reason_id: i64, quantity: u32) -> Self {
        Self {
            reason_id: Some(reason_id),
            quantity,
        }
    }

    /// 明细行是否完整（已选原因且数量>0）
    pub fn is_complete(&self) -> bool {
        self.reason_id.is_some() && self.quantity > 0
    }
}

/// 单条检验记录（表单态）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionEntryDraft {
    #[serde(default)]
    pub part_number_id: Option<i64>,

    /// Eaton LPN（自由文本）
    #[serde(default)]
    pub lpn: String,

    /// 供应商批号（自由文本）
    #[serde(default)]
    pub lot: String,

    /// 开始时间，"HH:MM" 当日时刻
    #[serde(default)]
    pub time_start: String,

    /// 结束时间，"HH:MM"；早于开始时间视为跨夜
    #[serde(default)]
    pub time_end: String,

    #[serde(default)]
    pub pieces_inspected: u32,

    /// 派生: pieces_inspected - pieces_not_ok，永不直接录入
    #[serde(default)]
    pub pieces_ok: u32,

    /// 录入后会被钳制到不超过 pieces_inspected
    #[serde(default)]
    pub pieces_not_ok: u32,

    #[serde(default)]
    pub rework_items: Vec<ReasonLineDraft>,

    #[serde(default)]
    pub rejection_items: Vec<ReasonLineDraft>,

    /// 用户申报的返工合计，仅用于核对 rework_items 求和；0 = 未申报
    #[serde(default)]
    pub declared_rework_total: u32,

    /// 派生: 时间段对应的分钟数（解析失败/未填为 0，永不为负）
    #[serde(default)]
    pub minutes_worked: i64,
}

/// 检验报告（表单态聚合根）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReportDraft {
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub shift_id: Option<i64>,

    #[serde(default)]
    pub inspector_id: Option<i64>,

    #[serde(default)]
    pub supervisor_id: Option<i64>,

    #[serde(default)]
    pub entries: Vec<InspectionEntryDraft>,

    /// 派生: Σ minutes_worked / 60，四舍五入保留2位
    #[serde(default)]
    pub hours_worked: f64,

    /// 派生: max(hours_worked - 8, 0)，保留2位
    #[serde(default)]
    pub overtime_hours: f64,

    /// 不足时数原因（目录id）；仅在 override_enabled 时参与校验
    #[serde(default)]
    pub no_hours_override_reason: Option<i64>,

    /// 调用方是否启用了"不足时数"例外勾选
    #[serde(default)]
    pub override_enabled: bool,
}

// ==========================================
// 读模型（列表/详情/看板）
// ==========================================

/// 报告列表行（目录名已联表带出）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: i64,
    pub date: NaiveDate,
    pub shift_name: String,
    pub inspector_name: String,
    pub supervisor_name: String,
    pub hours_worked: f64,
    pub overtime_hours: f64,
    pub entry_count: i64,
}

/// 明细行（读模型）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonLineDetail {
    pub kind: LineKind,
    pub reason_id: i64,
    pub reason_name: String,
    pub quantity: u32,
}

/// 检验记录（读模型）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetail {
    pub id: i64,
    pub part_number_id: i64,
    pub part_number: String,
    pub description: String,
    pub platform: String,
    pub supplier: String,
    pub lpn: String,
    pub lot: String,
    pub time_start: String,
    pub time_end: String,
    pub minutes_worked: i64,
    pub pieces_inspected: u32,
    pub pieces_ok: u32,
    pub pieces_not_ok: u32,
    pub declared_rework_total: u32,
    pub rework_items: Vec<ReasonLineDetail>,
    pub rejection_items: Vec<ReasonLineDetail>,
}

/// 报告详情（读模型）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    pub id: i64,
    pub date: NaiveDate,
    pub shift_id: i64,
    pub inspector_id: i64,
    pub supervisor_id: i64,
    pub hours_worked: f64,
    pub overtime_hours: f64,
    pub no_hours_override_reason: Option<i64>,
    pub entries: Vec<EntryDetail>,
}

impl ReportDetail {
    /// 详情 → 表单快照（编辑页回填）
    pub fn into_draft(self) -> InspectionReportDraft {
        InspectionReportDraft {
            date: Some(self.date),
            shift_id: Some(self.shift_id),
            inspector_id: Some(self.inspector_id),
            supervisor_id: Some(self.supervisor_id),
            hours_worked: self.hours_worked,
            overtime_hours: self.overtime_hours,
            no_hours_override_reason: self.no_hours_override_reason,
            override_enabled: self.no_hours_override_reason.is_some(),
            entries: self
                .entries
                .into_iter()
                .map(|e| InspectionEntryDraft {
                    part_number_id: Some(e.part_number_id),
                    lpn: e.lpn,
                    lot: e.lot,
                    time_start: e.time_start,
                    time_end: e.time_end,
                    pieces_inspected: e.pieces_inspected,
                    pieces_ok: e.pieces_ok,
                    pieces_not_ok: e.pieces_not_ok,
                    declared_rework_total: e.declared_rework_total,
                    minutes_worked: e.minutes_worked,
                    rework_items: e
                        .rework_items
                        .into_iter()
                        .map(|l| ReasonLineDraft::new(l.reason_id, l.quantity))
                        .collect(),
                    rejection_items: e
                        .rejection_items
                        .into_iter()
                        .map(|l| ReasonLineDraft::new(l.reason_id, l.quantity))
                        .collect(),
                })
                .collect(),
        }
    }
}

// ==========================================
// 看板聚合（数据，不含渲染）
// ==========================================

/// 按日 OK/NOK 合计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkNokDaily {
    pub date: NaiveDate,
    pub pieces_ok: i64,
    pub pieces_not_ok: i64,
}

/// 缺陷帕累托切片（按拒收数量降序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectParetoSlice {
    pub reason_id: i64,
    pub reason_name: String,
    pub quantity: i64,
}
