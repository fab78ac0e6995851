// ==========================================
// 质检报告系统 - 目录维护 API
// ==========================================
// 职责: 九类通用目录与零件号的维护接口（录入员/管理员使用）
// 说明: 名称在入口处裁剪并校验非空；重名转换为本地化业务错误
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{CatalogItem, NewPartNumber, PartNumber};
use crate::domain::types::CatalogKind;
use crate::i18n::{t, t_with_args};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::part_number_repo::PartNumberRepository;

// ==========================================
// CatalogApi - 目录维护 API
// ==========================================
pub struct CatalogApi {
    repos: HashMap<CatalogKind, Arc<CatalogRepository>>,
    part_number_repo: Arc<PartNumberRepository>,
}

impl CatalogApi {
    /// 创建新的CatalogApi实例
    ///
    /// # 参数
    /// - repos: 九类目录仓储（按 CatalogKind 索引，见 AppState 装配）
    /// - part_number_repo: 零件号仓储
    pub fn new(
        repos: HashMap<CatalogKind, Arc<CatalogRepository>>,
        part_number_repo: Arc<PartNumberRepository>,
    ) -> Self {
        Self {
            repos,
            part_number_repo,
        }
    }

    fn repo(&self, kind: CatalogKind) -> ApiResult<&Arc<CatalogRepository>> {
        self.repos
            .get(&kind)
            .ok_or_else(|| ApiError::InternalError(format!("目录仓储未装配: {:?}", kind)))
    }

    /// 名称入口校验: 裁剪空白，空名拒绝
    fn normalized_name(name: &str) -> ApiResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput(t("catalog.name_required")));
        }
        Ok(trimmed.to_string())
    }

    /// 重名错误本地化
    fn map_duplicate(err: RepositoryError, name: &str) -> ApiError {
        match err {
            RepositoryError::UniqueConstraintViolation(_) => ApiError::BusinessRuleViolation(
                t_with_args("catalog.duplicate_name", &[("name", name)]),
            ),
            other => other.into(),
        }
    }

    // ==========================================
    // 通用目录
    // ==========================================

    /// 列出目录项（维护界面含停用项，下拉框仅启用项）
    pub fn list_items(&self, kind: CatalogKind, include_inactive: bool) -> ApiResult<Vec<CatalogItem>> {
        Ok(self.repo(kind)?.list(include_inactive)?)
    }

    pub fn create_item(&self, kind: CatalogKind, name: &str) -> ApiResult<i64> {
        let name = Self::normalized_name(name)?;
        let id = self
            .repo(kind)?
            .create(&name)
            .map_err(|e| Self::map_duplicate(e, &name))?;
        tracing::info!(catalog = kind.entity_name(), id, name = %name, "目录项已创建");
        Ok(id)
    }

    pub fn rename_item(&self, kind: CatalogKind, id: i64, name: &str) -> ApiResult<()> {
        let name = Self::normalized_name(name)?;
        self.repo(kind)?
            .rename(id, &name)
            .map_err(|e| Self::map_duplicate(e, &name))?;
        Ok(())
    }

    pub fn set_item_active(&self, kind: CatalogKind, id: i64, active: bool) -> ApiResult<()> {
        Ok(self.repo(kind)?.set_active(id, active)?)
    }

    pub fn delete_item(&self, kind: CatalogKind, id: i64) -> ApiResult<()> {
        self.repo(kind)?.delete(id)?;
        tracing::info!(catalog = kind.entity_name(), id, "目录项已删除");
        Ok(())
    }

    // ==========================================
    // 零件号
    // ==========================================

    pub fn list_part_numbers(&self, include_inactive: bool) -> ApiResult<Vec<PartNumber>> {
        Ok(self.part_number_repo.list(include_inactive)?)
    }

    pub fn get_part_number(&self, id: i64) -> ApiResult<PartNumber> {
        self.part_number_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("PartNumber(id={})不存在", id)))
    }

    pub fn create_part_number(&self, payload: &NewPartNumber) -> ApiResult<i64> {
        let number = Self::normalized_name(&payload.number)?;
        let normalized = NewPartNumber {
            number: number.clone(),
            ..payload.clone()
        };
        let id = self
            .part_number_repo
            .create(&normalized)
            .map_err(|e| Self::map_duplicate(e, &number))?;
        tracing::info!(id, number = %number, "零件号已创建");
        Ok(id)
    }

    pub fn update_part_number(&self, id: i64, payload: &NewPartNumber) -> ApiResult<()> {
        let number = Self::normalized_name(&payload.number)?;
        let normalized = NewPartNumber {
            number: number.clone(),
            ..payload.clone()
        };
        self.part_number_repo
            .update(id, &normalized)
            .map_err(|e| Self::map_duplicate(e, &number))?;
        Ok(())
    }

    pub fn set_part_number_active(&self, id: i64, active: bool) -> ApiResult<()> {
        Ok(self.part_number_repo.set_active(id, active)?)
    }

    pub fn delete_part_number(&self, id: i64) -> ApiResult<()> {
        Ok(self.part_number_repo.delete(id)?)
    }
}
