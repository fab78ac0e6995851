// ==========================================
// 质检报告系统 - 检验报告仓储
// ==========================================
// 职责: 报告聚合根(报告头/检验记录/明细行)的事务化读写与看板聚合查询
// 表结构:
//   inspection_report      报告头
//   inspection_entry       检验记录（按 seq_no 保序）
//   inspection_entry_line  返工/拒收明细行（line_kind 区分两轴）
// 红线: 不做业务校验；派生字段由引擎重算后传入，仓储照单存储
// ==========================================

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::open_sqlite_connection;
use crate::domain::report::{
    DefectParetoSlice, EntryDetail, InspectionReportDraft, OkNokDaily, ReasonLineDetail,
    ReportDetail, ReportSummary,
};
use crate::domain::types::LineKind;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_tables()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_tables()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_tables(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS inspection_report (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              report_date TEXT NOT NULL,
              shift_id INTEGER NOT NULL,
              inspector_id INTEGER NOT NULL,
              supervisor_id INTEGER NOT NULL,
              hours_worked REAL NOT NULL DEFAULT 0,
              overtime_hours REAL NOT NULL DEFAULT 0,
              no_hours_override_reason INTEGER,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS inspection_entry (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              report_id INTEGER NOT NULL REFERENCES inspection_report(id) ON DELETE CASCADE,
              seq_no INTEGER NOT NULL,
              part_number_id INTEGER NOT NULL,
              lpn TEXT NOT NULL DEFAULT '',
              lot TEXT NOT NULL DEFAULT '',
              time_start TEXT NOT NULL DEFAULT '',
              time_end TEXT NOT NULL DEFAULT '',
              minutes_worked INTEGER NOT NULL DEFAULT 0,
              pieces_inspected INTEGER NOT NULL DEFAULT 0,
              pieces_ok INTEGER NOT NULL DEFAULT 0,
              pieces_not_ok INTEGER NOT NULL DEFAULT 0,
              declared_rework_total INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS inspection_entry_line (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              entry_id INTEGER NOT NULL REFERENCES inspection_entry(id) ON DELETE CASCADE,
              line_kind TEXT NOT NULL,
              reason_id INTEGER NOT NULL,
              quantity INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entry_report ON inspection_entry(report_id);
            CREATE INDEX IF NOT EXISTS idx_line_entry ON inspection_entry_line(entry_id);
            CREATE INDEX IF NOT EXISTS idx_report_date ON inspection_report(report_date);
            "#,
        )?;

        // 联表读取的目录/零件号表归属其他仓储；独立使用本仓储（new(db_path)）时
        // 它们可能尚未建表。这里按同一 DDL 幂等补建，保证读路径只会出现
        // COALESCE 空串兜底，而不是 "no such table"。
        for table in [
            "catalog_shift",
            "catalog_inspector",
            "catalog_supervisor",
            "catalog_defect_reason",
            "catalog_rework_reason",
        ] {
            conn.execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                  id INTEGER PRIMARY KEY AUTOINCREMENT,
                  name TEXT NOT NULL UNIQUE,
                  active INTEGER NOT NULL DEFAULT 1,
                  created_at TEXT NOT NULL DEFAULT (datetime('now')),
                  updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE INDEX IF NOT EXISTS idx_{table}_active ON {table}(active);
                "#,
            ))?;
        }
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS part_number (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              number TEXT NOT NULL UNIQUE,
              description TEXT NOT NULL DEFAULT '',
              platform TEXT NOT NULL DEFAULT '',
              supplier TEXT NOT NULL DEFAULT '',
              active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_part_number_active ON part_number(active);
            "#,
        )?;
        Ok(())
    }

    fn require_id(field: &str, value: Option<i64>) -> RepositoryResult<i64> {
        value.ok_or_else(|| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: "必填字段缺失".to_string(),
        })
    }

    fn require_date(value: Option<NaiveDate>) -> RepositoryResult<NaiveDate> {
        value.ok_or_else(|| RepositoryError::FieldValueError {
            field: "date".to_string(),
            message: "必填字段缺失".to_string(),
        })
    }

    // ==========================================
    // 写路径（事务）
    // ==========================================

    /// 新建报告（整棵聚合树在同一事务内落库），返回报告 id
    pub fn insert_report(&self, draft: &InspectionReportDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO inspection_report
              (report_date, shift_id, inspector_id, supervisor_id,
               hours_worked, overtime_hours, no_hours_override_reason)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                Self::require_date(draft.date)?,
                Self::require_id("shiftId", draft.shift_id)?,
                Self::require_id("inspectorId", draft.inspector_id)?,
                Self::require_id("supervisorId", draft.supervisor_id)?,
                draft.hours_worked,
                draft.overtime_hours,
                draft.no_hours_override_reason
            ],
        )?;
        let report_id = tx.last_insert_rowid();

        Self::insert_entries(&tx, report_id, draft)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(report_id)
    }

    /// 更新报告：报告头就地更新，检验记录整体重建
    pub fn update_report(&self, id: i64, draft: &InspectionReportDraft) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let affected = tx.execute(
            r#"
            UPDATE inspection_report
            SET report_date = ?1, shift_id = ?2, inspector_id = ?3, supervisor_id = ?4,
                hours_worked = ?5, overtime_hours = ?6, no_hours_override_reason = ?7,
                updated_at = datetime('now')
            WHERE id = ?8
            "#,
            params![
                Self::require_date(draft.date)?,
                Self::require_id("shiftId", draft.shift_id)?,
                Self::require_id("inspectorId", draft.inspector_id)?,
                Self::require_id("supervisorId", draft.supervisor_id)?,
                draft.hours_worked,
                draft.overtime_hours,
                draft.no_hours_override_reason,
                id
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "InspectionReport".to_string(),
                id: id.to_string(),
            });
        }

        // 级联删除会一并清掉明细行
        tx.execute(
            "DELETE FROM inspection_entry WHERE report_id = ?1",
            params![id],
        )?;
        Self::insert_entries(&tx, id, draft)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn insert_entries(
        tx: &Connection,
        report_id: i64,
        draft: &InspectionReportDraft,
    ) -> RepositoryResult<()> {
        for (seq_no, entry) in draft.entries.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO inspection_entry
                  (report_id, seq_no, part_number_id, lpn, lot, time_start, time_end,
                   minutes_worked, pieces_inspected, pieces_ok, pieces_not_ok,
                   declared_rework_total)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    report_id,
                    seq_no as i64,
                    Self::require_id("partNumberId", entry.part_number_id)?,
                    entry.lpn,
                    entry.lot,
                    entry.time_start,
                    entry.time_end,
                    entry.minutes_worked,
                    entry.pieces_inspected,
                    entry.pieces_ok,
                    entry.pieces_not_ok,
                    entry.declared_rework_total
                ],
            )?;
            let entry_id = tx.last_insert_rowid();

            // 未填完整的占位行在保存时丢弃
            let lines = entry
                .rework_items
                .iter()
                .map(|l| (LineKind::Rework, l))
                .chain(entry.rejection_items.iter().map(|l| (LineKind::Rejection, l)))
                .filter(|(_, l)| l.is_complete());

            for (kind, line) in lines {
                tx.execute(
                    r#"
                    INSERT INTO inspection_entry_line (entry_id, line_kind, reason_id, quantity)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![
                        entry_id,
                        kind.as_db_str(),
                        Self::require_id("reasonId", line.reason_id)?,
                        line.quantity
                    ],
                )?;
            }
        }
        Ok(())
    }

    pub fn delete_report(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM inspection_report WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "InspectionReport".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 读路径
    // ==========================================

    /// 报告列表（目录名联表带出，已停用/已删除目录项以空串兜底）
    pub fn list_summaries(&self) -> RepositoryResult<Vec<ReportSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.report_date,
                   COALESCE(s.name, ''), COALESCE(i.name, ''), COALESCE(sv.name, ''),
                   r.hours_worked, r.overtime_hours,
                   (SELECT COUNT(*) FROM inspection_entry e WHERE e.report_id = r.id)
            FROM inspection_report r
            LEFT JOIN catalog_shift s ON s.id = r.shift_id
            LEFT JOIN catalog_inspector i ON i.id = r.inspector_id
            LEFT JOIN catalog_supervisor sv ON sv.id = r.supervisor_id
            ORDER BY r.report_date DESC, r.id DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ReportSummary {
                id: row.get(0)?,
                date: row.get(1)?,
                shift_name: row.get(2)?,
                inspector_name: row.get(3)?,
                supervisor_name: row.get(4)?,
                hours_worked: row.get(5)?,
                overtime_hours: row.get(6)?,
                entry_count: row.get(7)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    /// 报告详情（整棵聚合树）
    pub fn find_detail(&self, id: i64) -> RepositoryResult<Option<ReportDetail>> {
        let conn = self.get_conn()?;

        let header = conn
            .query_row(
                r#"
                SELECT id, report_date, shift_id, inspector_id, supervisor_id,
                       hours_worked, overtime_hours, no_hours_override_reason
                FROM inspection_report WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, NaiveDate>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, f64>(5)?,
                        row.get::<_, f64>(6)?,
                        row.get::<_, Option<i64>>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            report_id,
            date,
            shift_id,
            inspector_id,
            supervisor_id,
            hours_worked,
            overtime_hours,
            no_hours_override_reason,
        )) = header
        else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT e.id, e.part_number_id,
                   COALESCE(p.number, ''), COALESCE(p.description, ''),
                   COALESCE(p.platform, ''), COALESCE(p.supplier, ''),
                   e.lpn, e.lot, e.time_start, e.time_end, e.minutes_worked,
                   e.pieces_inspected, e.pieces_ok, e.pieces_not_ok,
                   e.declared_rework_total
            FROM inspection_entry e
            LEFT JOIN part_number p ON p.id = e.part_number_id
            WHERE e.report_id = ?1
            ORDER BY e.seq_no
            "#,
        )?;
        let entry_rows = stmt.query_map(params![report_id], |row| {
            Ok(EntryDetail {
                id: row.get(0)?,
                part_number_id: row.get(1)?,
                part_number: row.get(2)?,
                description: row.get(3)?,
                platform: row.get(4)?,
                supplier: row.get(5)?,
                lpn: row.get(6)?,
                lot: row.get(7)?,
                time_start: row.get(8)?,
                time_end: row.get(9)?,
                minutes_worked: row.get(10)?,
                pieces_inspected: row.get(11)?,
                pieces_ok: row.get(12)?,
                pieces_not_ok: row.get(13)?,
                declared_rework_total: row.get(14)?,
                rework_items: Vec::new(),
                rejection_items: Vec::new(),
            })
        })?;

        let mut entries = Vec::new();
        for row in entry_rows {
            entries.push(row?);
        }

        for entry in &mut entries {
            let (rework, rejection) = Self::load_lines(&conn, entry.id)?;
            entry.rework_items = rework;
            entry.rejection_items = rejection;
        }

        Ok(Some(ReportDetail {
            id: report_id,
            date,
            shift_id,
            inspector_id,
            supervisor_id,
            hours_worked,
            overtime_hours,
            no_hours_override_reason,
            entries,
        }))
    }

    /// 按明细行类型联表对应的原因目录取名
    fn load_lines(
        conn: &Connection,
        entry_id: i64,
    ) -> RepositoryResult<(Vec<ReasonLineDetail>, Vec<ReasonLineDetail>)> {
        let mut stmt = conn.prepare(
            r#"
            SELECT l.line_kind, l.reason_id, l.quantity,
                   COALESCE(CASE l.line_kind
                     WHEN 'REWORK' THEN rw.name
                     ELSE dr.name
                   END, '')
            FROM inspection_entry_line l
            LEFT JOIN catalog_rework_reason rw ON rw.id = l.reason_id
            LEFT JOIN catalog_defect_reason dr ON dr.id = l.reason_id
            WHERE l.entry_id = ?1
            ORDER BY l.id
            "#,
        )?;
        let rows = stmt.query_map(params![entry_id], |row| {
            let kind_str: String = row.get(0)?;
            let kind = LineKind::from_db_str(&kind_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("未知明细行类型: {}", kind_str).into(),
                )
            })?;
            Ok(ReasonLineDetail {
                kind,
                reason_id: row.get(1)?,
                reason_name: row.get(3)?,
                quantity: row.get(2)?,
            })
        })?;

        let mut rework = Vec::new();
        let mut rejection = Vec::new();
        for row in rows {
            let line = row?;
            match line.kind {
                LineKind::Rework => rework.push(line),
                LineKind::Rejection => rejection.push(line),
            }
        }
        Ok((rework, rejection))
    }

    // ==========================================
    // 看板聚合
    // ==========================================

    /// 区间内按日 OK/NOK 合计
    pub fn ok_nok_by_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<OkNokDaily>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.report_date, SUM(e.pieces_ok), SUM(e.pieces_not_ok)
            FROM inspection_report r
            JOIN inspection_entry e ON e.report_id = r.id
            WHERE r.report_date BETWEEN ?1 AND ?2
            GROUP BY r.report_date
            ORDER BY r.report_date
            "#,
        )?;
        let rows = stmt.query_map(params![from, to], |row| {
            Ok(OkNokDaily {
                date: row.get(0)?,
                pieces_ok: row.get(1)?,
                pieces_not_ok: row.get(2)?,
            })
        })?;

        let mut days = Vec::new();
        for row in rows {
            days.push(row?);
        }
        Ok(days)
    }

    /// 区间内缺陷帕累托（按拒收数量降序）
    pub fn defect_pareto(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DefectParetoSlice>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT l.reason_id, COALESCE(dr.name, ''), SUM(l.quantity) AS total
            FROM inspection_entry_line l
            JOIN inspection_entry e ON e.id = l.entry_id
            JOIN inspection_report r ON r.id = e.report_id
            LEFT JOIN catalog_defect_reason dr ON dr.id = l.reason_id
            WHERE l.line_kind = 'REJECTION'
              AND r.report_date BETWEEN ?1 AND ?2
            GROUP BY l.reason_id, dr.name
            ORDER BY total DESC
            "#,
        )?;
        let rows = stmt.query_map(params![from, to], |row| {
            Ok(DefectParetoSlice {
                reason_id: row.get(0)?,
                reason_name: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?;

        let mut slices = Vec::new();
        for row in rows {
            slices.push(row?);
        }
        Ok(slices)
    }
}
