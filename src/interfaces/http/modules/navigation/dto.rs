//! Navigation DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NavigateRequest {
    /// Target page slug, e.g. `dashboard`, `pharmacy`, `analytics`.
    #[validate(length(min = 1, max = 64, message = "page is required"))]
    pub page: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NavigationResponse {
    pub page: String,
    pub label: String,
    /// `false` once the navigation ended the session.
    pub signed_in: bool,
}
