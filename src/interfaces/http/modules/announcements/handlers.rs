//! Announcement API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension,
};

use super::dto::{AnnouncementBody, UpdateAnnouncementRequest};
use crate::application::AnnouncementService;
use crate::domain::Announcement;
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

#[derive(Clone)]
pub struct AnnouncementState {
    pub announcements: Arc<AnnouncementService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/announcements",
    tag = "Announcements",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Announcements, newest first", body = ApiResponse<Vec<Announcement>>),
        (status = 502, description = "Backend read failed")
    )
)]
pub async fn list_announcements(
    State(state): State<AnnouncementState>,
) -> ApiResult<Vec<Announcement>> {
    let items = state.announcements.list().await.map_err(api_error)?;
    ok(items)
}

#[utoipa::path(
    post,
    path = "/api/v1/announcements",
    tag = "Announcements",
    security(("bearer_auth" = [])),
    request_body = AnnouncementBody,
    responses(
        (status = 200, description = "Announcement posted", body = ApiResponse<Announcement>),
        (status = 403, description = "Executives only")
    )
)]
pub async fn create_announcement(
    State(state): State<AnnouncementState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<AnnouncementBody>,
) -> ApiResult<Announcement> {
    let created = state
        .announcements
        .create(&current.user, body.into())
        .await
        .map_err(api_error)?;
    ok(created)
}

#[utoipa::path(
    put,
    path = "/api/v1/announcements/{id}",
    tag = "Announcements",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Announcement id")),
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = ApiResponse<Announcement>),
        (status = 403, description = "Executives only"),
        (status = 404, description = "No such announcement, or it changed since it was read")
    )
)]
pub async fn update_announcement(
    State(state): State<AnnouncementState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateAnnouncementRequest>,
) -> ApiResult<Announcement> {
    let (expected, draft) = request.into_parts();
    let updated = state
        .announcements
        .update(&current.user, id, expected, draft)
        .await
        .map_err(api_error)?;
    ok(updated)
}

#[utoipa::path(
    delete,
    path = "/api/v1/announcements/{id}",
    tag = "Announcements",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Announcement id")),
    responses(
        (status = 200, description = "Announcement deleted"),
        (status = 403, description = "Executives only"),
        (status = 404, description = "No such announcement")
    )
)]
pub async fn delete_announcement(
    State(state): State<AnnouncementState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state
        .announcements
        .delete(&current.user, id)
        .await
        .map_err(api_error)?;
    ok(())
}
