//! Dashboard: headline metrics, department tiles and announcements

use std::sync::Arc;

use axum::{extract::State, Extension};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::{AnnouncementService, DashboardService, DepartmentCard, DepartmentService};
use crate::domain::dashboard::FactMetrics;
use crate::domain::{Announcement, UserSession};
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::CurrentUser;

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: Arc<DashboardService>,
    pub departments: Arc<DepartmentService>,
    pub announcements: Arc<AnnouncementService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub user: UserSession,
    pub is_executive: bool,
    pub metrics: FactMetrics,
    pub departments: Vec<DepartmentCard>,
    pub announcements: Vec<Announcement>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard", body = ApiResponse<DashboardResponse>),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_dashboard(
    State(state): State<DashboardState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<DashboardResponse> {
    let (metrics, announcements) =
        tokio::join!(state.dashboard.metrics(), state.announcements.list());
    let announcements = announcements.map_err(api_error)?;
    let user = current.user;
    ok(DashboardResponse {
        is_executive: user.is_executive(),
        departments: state.departments.cards(&user),
        metrics,
        announcements,
        user,
    })
}
