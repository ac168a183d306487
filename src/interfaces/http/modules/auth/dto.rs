//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::navigation::MenuEntry;
use crate::domain::UserSession;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Employee email; matched case-insensitively.
    #[serde(alias = "username")]
    #[validate(length(min = 1, max = 254, message = "email is required"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: UserSession,
    pub is_executive: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionInfo {
    pub user: UserSession,
    pub is_executive: bool,
    pub menu: Vec<MenuEntry>,
}
