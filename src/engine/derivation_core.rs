// ==========================================
// 质检报告系统 - 派生字段纯函数库
// ==========================================
// 职责: 时间段→分钟数、件数钳制、工时/加班小时的派生
// 红线: 无状态、无副作用、无 I/O 操作
// 调用约定: 任一原始字段变更后，调用方统一走 recompute_report 单入口重算，
//           不在各输入处散落重算逻辑
// ==========================================

use chrono::NaiveTime;

use crate::domain::report::{InspectionEntryDraft, InspectionReportDraft};

/// 一天的分钟数（跨夜换算用）
const MINUTES_PER_DAY: i64 = 1_440;

// ==========================================
// DerivationCore - 纯函数工具类
// ==========================================
pub struct DerivationCore;

impl DerivationCore {
    /// 解析 "HH:MM" 时刻（兼容 "HH:MM:SS"）
    ///
    /// # 返回
    /// - Some(NaiveTime): 解析成功
    /// - None: 为空或格式非法
    pub fn parse_clock(value: &str) -> Option<NaiveTime> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .ok()
    }

    /// 计算时间段分钟数
    ///
    /// # 规则
    /// - 两端按当日时刻解析
    /// - 结束早于开始 → 视为跨夜，结束时刻加一天再求差
    /// - 两端相等 → 0
    /// - 任一端解析失败 → 0（永不为负，永不传播非法值）
    ///
    /// # 示例
    /// - "22:00" → "06:00" = 480
    /// - "09:00" → "08:30" = 1410（按跨夜处理，而非负值）
    pub fn minutes_between(time_start: &str, time_end: &str) -> i64 {
        let (start, end) = match (Self::parse_clock(time_start), Self::parse_clock(time_end)) {
            (Some(s), Some(e)) => (s, e),
            _ => return 0,
        };

        let diff = end.signed_duration_since(start).num_minutes();
        if diff < 0 {
            diff + MINUTES_PER_DAY
        } else {
            diff
        }
    }

    /// 四舍五入保留2位小数（round-half-up）
    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    /// 分钟合计 → 小时（保留2位）
    pub fn hours_from_minutes(total_minutes: i64) -> f64 {
        Self::round2(total_minutes as f64 / 60.0)
    }

    /// 加班小时 = max(hours - full_shift_hours, 0)，保留2位
    pub fn overtime_hours(hours_worked: f64, full_shift_hours: f64) -> f64 {
        Self::round2((hours_worked - full_shift_hours).max(0.0))
    }

    /// 件数钳制与派生
    ///
    /// # 规则（固定顺序）
    /// 1. NOK 超过检验数 → 钳制到检验数
    /// 2. OK = 检验数 - NOK（派生，永不直接录入）
    ///
    /// # 返回
    /// - (pieces_ok, pieces_not_ok)
    pub fn clamp_piece_counts(pieces_inspected: u32, pieces_not_ok: u32) -> (u32, u32) {
        let not_ok = pieces_not_ok.min(pieces_inspected);
        (pieces_inspected - not_ok, not_ok)
    }

    /// 重算单条检验记录的派生字段
    pub fn recompute_entry(entry: &mut InspectionEntryDraft) {
        let (ok, not_ok) = Self::clamp_piece_counts(entry.pieces_inspected, entry.pieces_not_ok);
        entry.pieces_ok = ok;
        entry.pieces_not_ok = not_ok;
        entry.minutes_worked = Self::minutes_between(&entry.time_start, &entry.time_end);
    }

    /// 重算整份报告的派生字段（单入口）
    ///
    /// 任一原始字段变更（含增删检验记录/明细行）后调用方都应重跑本函数，
    /// 提交前最后一次调用保证快照一致。
    pub fn recompute_report(report: &mut InspectionReportDraft, full_shift_hours: f64) {
        let mut total_minutes: i64 = 0;
        for entry in &mut report.entries {
            Self::recompute_entry(entry);
            total_minutes += entry.minutes_worked;
        }
        report.hours_worked = Self::hours_from_minutes(total_minutes);
        report.overtime_hours = Self::overtime_hours(report.hours_worked, full_shift_hours);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_same_day() {
        assert_eq!(DerivationCore::minutes_between("08:00", "12:30"), 270);
    }

    #[test]
    fn test_minutes_overnight_wrap() {
        // 夜班 22:00 → 06:00
        assert_eq!(DerivationCore::minutes_between("22:00", "06:00"), 480);
    }

    #[test]
    fn test_minutes_equal_times() {
        assert_eq!(DerivationCore::minutes_between("08:00", "08:00"), 0);
    }

    #[test]
    fn test_minutes_end_slightly_before_start_wraps() {
        // 09:00 → 08:30 不允许为负，按跨夜处理
        assert_eq!(DerivationCore::minutes_between("09:00", "08:30"), 1410);
    }

    #[test]
    fn test_minutes_unparsable_is_zero() {
        assert_eq!(DerivationCore::minutes_between("", "08:00"), 0);
        assert_eq!(DerivationCore::minutes_between("08:00", ""), 0);
        assert_eq!(DerivationCore::minutes_between("25:99", "08:00"), 0);
        assert_eq!(DerivationCore::minutes_between("ocho", "08:00"), 0);
    }

    #[test]
    fn test_minutes_accepts_seconds_suffix() {
        assert_eq!(DerivationCore::minutes_between("08:00:00", "09:00:00"), 60);
    }

    #[test]
    fn test_hours_rounding() {
        // 540 分钟 = 9.00 小时
        assert_eq!(DerivationCore::hours_from_minutes(540), 9.0);
        // 500 分钟 = 8.333... → 8.33
        assert_eq!(DerivationCore::hours_from_minutes(500), 8.33);
        // 475 分钟 = 7.9166... → 7.92
        assert_eq!(DerivationCore::hours_from_minutes(475), 7.92);
    }

    #[test]
    fn test_overtime() {
        assert_eq!(DerivationCore::overtime_hours(9.0, 8.0), 1.0);
        assert_eq!(DerivationCore::overtime_hours(7.5, 8.0), 0.0);
        assert_eq!(DerivationCore::overtime_hours(8.0, 8.0), 0.0);
    }

    #[test]
    fn test_clamp_piece_counts() {
        assert_eq!(DerivationCore::clamp_piece_counts(10, 3), (7, 3));
        // NOK 超过检验数 → 钳制，OK 归零
        assert_eq!(DerivationCore::clamp_piece_counts(5, 9), (0, 5));
        assert_eq!(DerivationCore::clamp_piece_counts(0, 0), (0, 0));
    }

    #[test]
    fn test_recompute_report_totals() {
        let mut report = InspectionReportDraft {
            entries: vec![
                InspectionEntryDraft {
                    time_start: "08:00".to_string(),
                    time_end: "12:00".to_string(), // 240 分钟
                    pieces_inspected: 10,
                    pieces_not_ok: 2,
                    ..Default::default()
                },
                InspectionEntryDraft {
                    time_start: "13:00".to_string(),
                    time_end: "18:00".to_string(), // 300 分钟
                    pieces_inspected: 4,
                    pieces_not_ok: 9, // 会被钳制到 4
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        DerivationCore::recompute_report(&mut report, 8.0);

        assert_eq!(report.entries[0].minutes_worked, 240);
        assert_eq!(report.entries[0].pieces_ok, 8);
        assert_eq!(report.entries[1].minutes_worked, 300);
        assert_eq!(report.entries[1].pieces_not_ok, 4);
        assert_eq!(report.entries[1].pieces_ok, 0);
        // 240+300 = 540 分钟 = 9.00 小时，加班 1.00
        assert_eq!(report.hours_worked, 9.0);
        assert_eq!(report.overtime_hours, 1.0);
    }

    #[test]
    fn test_clamp_invariant_after_any_edit() {
        // 不变式: 任意编辑后 pieces_ok + pieces_not_ok == pieces_inspected
        let cases = [(0u32, 0u32), (10, 0), (10, 10), (10, 11), (1, 100)];
        for (inspected, not_ok) in cases {
            let (ok, clamped) = DerivationCore::clamp_piece_counts(inspected, not_ok);
            assert_eq!(ok + clamped, inspected);
        }
    }
}
