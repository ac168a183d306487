//! Authentication middleware for Axum
//!
//! Resolves `Authorization: Bearer <token>` to a live session and stores it
//! in request extensions as [`CurrentUser`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::SessionService;
use crate::domain::UserSession;
use crate::interfaces::http::common::ApiResponse;

/// Authentication state
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionService>,
}

/// The signed-in caller, available to handlers via `Extension<CurrentUser>`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub session_id: String,
    pub user: UserSession,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unauthorized(message: impl Into<String>) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

/// Bearer-session authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .map(String::from);
    let Some(token) = token else {
        return unauthorized("Access Denied: You must be signed in.");
    };

    match auth_state.sessions.resolve(&token) {
        Ok((session_id, user)) => {
            request
                .extensions_mut()
                .insert(CurrentUser { session_id, user });
            next.run(request).await
        }
        Err(e) => unauthorized(e.to_string()),
    }
}
