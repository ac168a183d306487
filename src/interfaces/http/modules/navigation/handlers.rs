//! Navigation API handlers

use std::sync::Arc;

use axum::{extract::State, Extension};

use super::dto::{NavigateRequest, NavigationResponse};
use crate::application::SessionService;
use crate::domain::navigation::{menu, Action, MenuEntry, Page, PortalState};
use crate::domain::DomainError;
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

#[derive(Clone)]
pub struct NavigationState {
    pub sessions: Arc<SessionService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/navigation",
    tag = "Navigation",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sidebar entries", body = ApiResponse<Vec<MenuEntry>>)
    )
)]
pub async fn get_menu(Extension(current): Extension<CurrentUser>) -> ApiResult<Vec<MenuEntry>> {
    ok(menu(&current.user))
}

/// Move the caller's portal to another page. Navigating to `login` signs out.
#[utoipa::path(
    post,
    path = "/api/v1/navigation",
    tag = "Navigation",
    security(("bearer_auth" = [])),
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Navigation accepted", body = ApiResponse<NavigationResponse>),
        (status = 403, description = "Page is not open to the caller"),
        (status = 404, description = "Unknown page")
    )
)]
pub async fn navigate(
    State(state): State<NavigationState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<NavigateRequest>,
) -> ApiResult<NavigationResponse> {
    let slug = request.page.trim();
    let target = Page::from_slug(slug)
        .ok_or_else(|| api_error(DomainError::NotFound(format!("page \"{}\"", slug))))?;

    let next = PortalState::signed_in(current.user)
        .reduce(Action::Navigate(target))
        .map_err(|denied| api_error(denied.into()))?;

    if next.user.is_none() {
        state.sessions.logout(&current.session_id);
    }
    ok(NavigationResponse {
        page: next.page.slug().to_string(),
        label: next.page.label().to_string(),
        signed_in: next.user.is_some(),
    })
}
