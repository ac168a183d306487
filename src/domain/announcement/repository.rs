//! Announcement repository interface

use async_trait::async_trait;

use super::model::{Announcement, AnnouncementDraft};
use crate::domain::DomainResult;

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Newest first. A missing table yields an empty list.
    async fn list(&self) -> DomainResult<Vec<Announcement>>;

    async fn create(&self, draft: AnnouncementDraft) -> DomainResult<Announcement>;

    /// Rewrite announcement `id`. When `expected` is given the row must also
    /// still carry that title and content. `Ok(None)` when nothing matched.
    async fn update(
        &self,
        id: i64,
        expected: Option<AnnouncementDraft>,
        draft: AnnouncementDraft,
    ) -> DomainResult<Option<Announcement>>;

    /// `Ok(false)` when no row had this id.
    async fn delete(&self, id: i64) -> DomainResult<bool>;
}
