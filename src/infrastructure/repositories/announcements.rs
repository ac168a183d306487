use async_trait::async_trait;
use tracing::warn;

use crate::domain::department::tables;
use crate::domain::ports::{Filter, SelectQuery, SharedGateway};
use crate::domain::{Announcement, AnnouncementDraft, AnnouncementRepository, DomainError, DomainResult};

use super::backend_err;

/// [`AnnouncementRepository`] over the `announcements` table.
pub struct AnnouncementStore {
    gateway: SharedGateway,
}

impl AnnouncementStore {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }

    fn target(id: i64, expected: Option<&AnnouncementDraft>) -> Vec<Filter> {
        let mut filters = vec![Filter::eq("id", id)];
        if let Some(expected) = expected {
            filters.push(Filter::eq("title", expected.title.as_str()));
            filters.push(Filter::eq("content", expected.content.as_str()));
        }
        filters
    }
}

#[async_trait]
impl AnnouncementRepository for AnnouncementStore {
    async fn list(&self) -> DomainResult<Vec<Announcement>> {
        match self.gateway.select(&SelectQuery::new(tables::ANNOUNCEMENTS)).await {
            Ok(rows) => {
                let mut items: Vec<Announcement> = rows.iter().map(Announcement::from_row).collect();
                Announcement::sort_newest_first(&mut items);
                Ok(items)
            }
            Err(e) if e.is_relation_missing() => {
                warn!("announcements table not found, returning no announcements");
                Ok(Vec::new())
            }
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn create(&self, draft: AnnouncementDraft) -> DomainResult<Announcement> {
        let rows = self
            .gateway
            .insert(tables::ANNOUNCEMENTS, vec![draft.to_row()])
            .await
            .map_err(backend_err)?;
        rows.first()
            .map(Announcement::from_row)
            .ok_or_else(|| DomainError::Backend("Announcement was not returned after insert".into()))
    }

    async fn update(
        &self,
        id: i64,
        expected: Option<AnnouncementDraft>,
        draft: AnnouncementDraft,
    ) -> DomainResult<Option<Announcement>> {
        let filters = Self::target(id, expected.as_ref());
        let rows = self
            .gateway
            .update(tables::ANNOUNCEMENTS, &filters, draft.to_row())
            .await
            .map_err(backend_err)?;
        Ok(rows.first().map(Announcement::from_row))
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        let rows = self
            .gateway
            .delete(tables::ANNOUNCEMENTS, &[Filter::eq("id", id)])
            .await
            .map_err(backend_err)?;
        Ok(!rows.is_empty())
    }
}
