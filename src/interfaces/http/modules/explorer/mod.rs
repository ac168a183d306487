//! Data explorer: executive browsing across every department table

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use super::departments::{DepartmentState, RecordPageDto, RecordsQuery};
use crate::application::ExplorerTable;
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::CurrentUser;

#[utoipa::path(
    get,
    path = "/api/v1/explorer/tables",
    tag = "Data Explorer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Browsable tables", body = ApiResponse<Vec<ExplorerTable>>),
        (status = 403, description = "Executives only")
    )
)]
pub async fn list_tables(
    State(state): State<DepartmentState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<ExplorerTable>> {
    state
        .departments
        .explorer_tables(&current.user)
        .map_err(api_error)
        .and_then(ok)
}

#[utoipa::path(
    get,
    path = "/api/v1/explorer/tables/{table}",
    tag = "Data Explorer",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name, e.g. `patients`"),
        RecordsQuery
    ),
    responses(
        (status = 200, description = "One page of rows", body = ApiResponse<RecordPageDto>),
        (status = 403, description = "Executives only"),
        (status = 404, description = "Table is not browsable")
    )
)]
pub async fn explore_table(
    State(state): State<DepartmentState>,
    Extension(current): Extension<CurrentUser>,
    Path(table): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<RecordPageDto> {
    let request = query.into_browse(state.portal.rows_per_page, state.portal.max_page_size);
    let page = state
        .departments
        .explore(&current.user, &table, request)
        .await
        .map_err(api_error)?;
    ok(page.into())
}
