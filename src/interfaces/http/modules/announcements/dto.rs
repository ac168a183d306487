//! Announcement DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::AnnouncementDraft;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AnnouncementBody {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
}

impl From<AnnouncementBody> for AnnouncementDraft {
    fn from(body: AnnouncementBody) -> Self {
        AnnouncementDraft::new(body.title, body.content)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
    /// The title and content the editor last saw; the update only applies
    /// while the row still holds them.
    pub expected: Option<AnnouncementBody>,
}

impl UpdateAnnouncementRequest {
    pub fn into_parts(self) -> (Option<AnnouncementDraft>, AnnouncementDraft) {
        (
            self.expected.map(Into::into),
            AnnouncementDraft::new(self.title, self.content),
        )
    }
}
