//! Department API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use super::dto::{RecordPageDto, RecordsQuery};
use crate::application::{DepartmentCard, DepartmentService};
use crate::config::PortalConfig;
use crate::domain::{Department, DomainError};
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::CurrentUser;

#[derive(Clone)]
pub struct DepartmentState {
    pub departments: Arc<DepartmentService>,
    pub portal: PortalConfig,
}

#[utoipa::path(
    get,
    path = "/api/v1/departments",
    tag = "Departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Department tiles with access flags", body = ApiResponse<Vec<DepartmentCard>>)
    )
)]
pub async fn list_departments(
    State(state): State<DepartmentState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<DepartmentCard>> {
    ok(state.departments.cards(&current.user))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments/{slug}/records",
    tag = "Departments",
    security(("bearer_auth" = [])),
    params(
        ("slug" = String, Path, description = "Department slug, e.g. `pharmacy`"),
        RecordsQuery
    ),
    responses(
        (status = 200, description = "One page of department records", body = ApiResponse<RecordPageDto>),
        (status = 400, description = "Column is not sortable"),
        (status = 403, description = "Department belongs to someone else"),
        (status = 404, description = "Unknown department"),
        (status = 502, description = "Backend read failed")
    )
)]
pub async fn list_department_records(
    State(state): State<DepartmentState>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<RecordPageDto> {
    let department = Department::from_slug(&slug)
        .ok_or_else(|| api_error(DomainError::NotFound(format!("department \"{}\"", slug))))?;
    let request = query.into_browse(state.portal.rows_per_page, state.portal.max_page_size);
    let page = state
        .departments
        .browse(&current.user, department, request)
        .await
        .map_err(api_error)?;
    ok(page.into())
}
