//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, Extension};

use super::dto::{LoginRequest, LoginResponse, SessionInfo};
use crate::application::SessionService;
use crate::domain::navigation::menu;
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub sessions: Arc<SessionService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "No employee with this email"),
        (status = 502, description = "Backend unavailable")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let outcome = state.sessions.login(&request.email).await.map_err(api_error)?;
    let is_executive = outcome.user.is_executive();
    ok(LoginResponse {
        token: outcome.token,
        token_type: outcome.token_type,
        expires_in: outcome.expires_in,
        expires_at: outcome.expires_at,
        user: outcome.user,
        is_executive,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session destroyed"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn logout(
    State(state): State<AuthHandlerState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<()> {
    state.sessions.logout(&current.session_id);
    ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = ApiResponse<SessionInfo>),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_current_user(Extension(current): Extension<CurrentUser>) -> ApiResult<SessionInfo> {
    let user = current.user;
    ok(SessionInfo {
        is_executive: user.is_executive(),
        menu: menu(&user),
        user,
    })
}
