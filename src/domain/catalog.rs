// ==========================================
// 质检报告系统 - 目录实体
// ==========================================
// 职责: 目录类记录的显式类型（入口处做结构校验，不信任后端/表单的松散对象）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// 通用目录项
// ==========================================
// 班次/检验员/主管/岗位/平台/供应商/缺陷原因/返工原因/不足时数原因
// 共用同一结构: id + 名称 + 启用标志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

// ==========================================
// 零件号 (Num Parte)
// ==========================================
// 选中零件号后，描述/平台/供应商作为只读字段带入检验记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartNumber {
    pub id: i64,
    pub number: String,
    pub description: String,
    pub platform: String,
    pub supplier: String,
    pub active: bool,
}

/// 新建/更新零件号的载荷
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPartNumber {
    pub number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub supplier: String,
}

// ==========================================
// 用户 (Usuario)
// ==========================================
// role_id/role_text 为原始值，规范角色由 RoleResolver 归一化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    /// 原始数值角色ID（可能缺失）
    pub role_id: Option<i64>,
    /// 原始角色文本（可能为空或脏数据）
    pub role_text: String,
    pub active: bool,
}

/// 新建/更新用户的载荷
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub role_text: String,
}
