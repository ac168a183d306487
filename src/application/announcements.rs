//! Announcement use-cases
//!
//! Every signed-in user reads the board; only executives write to it.

use std::sync::Arc;

use tracing::info;

use crate::domain::access::{authorize, Resource};
use crate::domain::{
    Announcement, AnnouncementDraft, AnnouncementRepository, DomainError, DomainResult,
    UserSession,
};

#[derive(Clone)]
pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
}

fn require_manager(user: &UserSession) -> DomainResult<()> {
    authorize(Some(user.department.as_deref()), Resource::AnnouncementManager)?;
    Ok(())
}

fn not_found(id: i64) -> DomainError {
    DomainError::NotFound(format!("announcement {}", id))
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>) -> Self {
        Self { repo }
    }

    /// Newest first; empty when the table does not exist yet.
    pub async fn list(&self) -> DomainResult<Vec<Announcement>> {
        self.repo.list().await
    }

    pub async fn create(
        &self,
        user: &UserSession,
        draft: AnnouncementDraft,
    ) -> DomainResult<Announcement> {
        require_manager(user)?;
        let draft = draft.validated()?;
        let created = self.repo.create(draft).await?;
        info!(id = ?created.id, by = %user.email, "Announcement posted");
        Ok(created)
    }

    /// Rewrite announcement `id`. With `expected`, the row must still hold
    /// that title and content; a stale or unknown target is `NotFound` and
    /// nothing changes.
    pub async fn update(
        &self,
        user: &UserSession,
        id: i64,
        expected: Option<AnnouncementDraft>,
        draft: AnnouncementDraft,
    ) -> DomainResult<Announcement> {
        require_manager(user)?;
        let draft = draft.validated()?;
        let updated = self
            .repo
            .update(id, expected, draft)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(id, by = %user.email, "Announcement updated");
        Ok(updated)
    }

    pub async fn delete(&self, user: &UserSession, id: i64) -> DomainResult<()> {
        require_manager(user)?;
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        info!(id, by = %user.email, "Announcement deleted");
        Ok(())
    }
}
