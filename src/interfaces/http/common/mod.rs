//! Shared HTTP plumbing: the response envelope, error mapping and the
//! validating JSON extractor.

pub mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::shared::PaginatedResult;

pub use validated_json::ValidatedJson;

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Paginated list payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Rows across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> From<PaginatedResult<T>> for PaginatedResponse<T> {
    fn from(result: PaginatedResult<T>) -> Self {
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn error_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Backend(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Map a domain error onto the envelope. Backend failures are logged.
pub fn api_error(error: DomainError) -> ApiError {
    let status = error_status(&error);
    if status == StatusCode::BAD_GATEWAY {
        warn!(error = %error, "Backend request failed");
    }
    (status, Json(ApiResponse::error(error.to_string())))
}

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::Backend("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (error, status) in cases {
            assert_eq!(api_error(error).0, status);
        }
    }

    #[test]
    fn test_forbidden_message_is_passed_through() {
        let (_, Json(body)) = api_error(DomainError::Forbidden(
            "Access Denied: Only Executive staff can access Analytics.".into(),
        ));
        assert!(!body.success);
        assert_eq!(
            body.error.as_deref(),
            Some("Access Denied: Only Executive staff can access Analytics.")
        );
    }
}
