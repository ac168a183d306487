//! Analytics: month-to-date operational report for executives

use std::sync::Arc;

use axum::{extract::State, Extension};
use chrono::Utc;

use crate::application::AnalyticsService;
use crate::domain::analytics::AnalyticsReport;
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::CurrentUser;

#[derive(Clone)]
pub struct AnalyticsState {
    pub analytics: Arc<AnalyticsService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Analytics report", body = ApiResponse<AnalyticsReport>),
        (status = 403, description = "Executives only"),
        (status = 502, description = "Backend read failed")
    )
)]
pub async fn get_analytics(
    State(state): State<AnalyticsState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<AnalyticsReport> {
    let report = state
        .analytics
        .report_for(&current.user, Utc::now())
        .await
        .map_err(api_error)?;
    ok(report)
}
