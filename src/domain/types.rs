// ==========================================
// 质检报告系统 - 领域类型定义
// ==========================================
// 角色体系: 数值角色ID优先，角色文本兜底
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 规范角色 (Canonical Role)
// ==========================================
// 原始用户记录携带 id_rol(数值) 与 rol(文本)，两者都可能缺失或脏；
// 归一化后只存在三种规范角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Administrator, // 管理员: 无路由限制
    Supervisor,    // 主管: 仅看板与报告路由
    Capturista,    // 录入员: 看板、报告与目录维护
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Administrator => write!(f, "ADMINISTRATOR"),
            Role::Supervisor => write!(f, "SUPERVISOR"),
            Role::Capturista => write!(f, "CAPTURISTA"),
        }
    }
}

// ==========================================
// 路由判定结果 (Route Decision)
// ==========================================
// (role, path) -> {allow, redirectTo} 的纯函数输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDecision {
    pub allow: bool,
    /// 拒绝时的跳转目标（允许时为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl RouteDecision {
    pub fn allow() -> Self {
        Self {
            allow: true,
            redirect_to: None,
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            allow: false,
            redirect_to: Some(to.to_string()),
        }
    }
}

// ==========================================
// 明细行类型 (Line Kind)
// ==========================================
// NOK 件的两条独立处理轴: 返工(补救)与拒收(缺陷分类)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineKind {
    Rework,    // 返工
    Rejection, // 拒收
}

impl LineKind {
    /// 数据库存储值
    pub fn as_db_str(&self) -> &'static str {
        match self {
            LineKind::Rework => "REWORK",
            LineKind::Rejection => "REJECTION",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "REWORK" => Some(LineKind::Rework),
            "REJECTION" => Some(LineKind::Rejection),
            _ => None,
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ==========================================
// 目录类型 (Catalog Kind)
// ==========================================
// 简单"id+名称+启用标志"目录的枚举；零件号与用户有独立实体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Shift,               // 班次 (turnos)
    Inspector,           // 检验员 (inspectores)
    SupervisorPerson,    // 主管 (supervisores)
    JobTitle,            // 岗位 (cargos)
    Platform,            // 平台 (plataformas)
    Supplier,            // 供应商 (proveedores)
    DefectReason,        // 缺陷/拒收原因 (defectos)
    ReworkReason,        // 返工原因 (retrabajos)
    HourShortfallReason, // 不足时数原因 (incumplimiento de horas)
}

impl CatalogKind {
    /// 所有目录类型（用于批量建表/遍历）
    pub const ALL: [CatalogKind; 9] = [
        CatalogKind::Shift,
        CatalogKind::Inspector,
        CatalogKind::SupervisorPerson,
        CatalogKind::JobTitle,
        CatalogKind::Platform,
        CatalogKind::Supplier,
        CatalogKind::DefectReason,
        CatalogKind::ReworkReason,
        CatalogKind::HourShortfallReason,
    ];

    /// 数据库表名
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::Shift => "catalog_shift",
            CatalogKind::Inspector => "catalog_inspector",
            CatalogKind::SupervisorPerson => "catalog_supervisor",
            CatalogKind::JobTitle => "catalog_job_title",
            CatalogKind::Platform => "catalog_platform",
            CatalogKind::Supplier => "catalog_supplier",
            CatalogKind::DefectReason => "catalog_defect_reason",
            CatalogKind::ReworkReason => "catalog_rework_reason",
            CatalogKind::HourShortfallReason => "catalog_hour_shortfall_reason",
        }
    }

    /// 实体名（用于错误消息）
    pub fn entity_name(&self) -> &'static str {
        match self {
            CatalogKind::Shift => "Shift",
            CatalogKind::Inspector => "Inspector",
            CatalogKind::SupervisorPerson => "Supervisor",
            CatalogKind::JobTitle => "JobTitle",
            CatalogKind::Platform => "Platform",
            CatalogKind::Supplier => "Supplier",
            CatalogKind::DefectReason => "DefectReason",
            CatalogKind::ReworkReason => "ReworkReason",
            CatalogKind::HourShortfallReason => "HourShortfallReason",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_kind_db_roundtrip() {
        assert_eq!(LineKind::from_db_str("REWORK"), Some(LineKind::Rework));
        assert_eq!(LineKind::from_db_str("REJECTION"), Some(LineKind::Rejection));
        assert_eq!(LineKind::from_db_str("OTHER"), None);
    }

    #[test]
    fn test_catalog_tables_are_distinct() {
        let mut tables: Vec<&str> = CatalogKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), CatalogKind::ALL.len());
    }
}
