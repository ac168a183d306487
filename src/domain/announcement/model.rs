use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::{value_as_i64, Row};
use crate::shared::{parse_timestamp, DomainError};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Announcement {
    /// Backend-assigned key. Absent only on rows the backend never numbered.
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    /// Backend timestamp, passed through untouched.
    pub created_at: Option<String>,
}

impl Announcement {
    pub fn from_row(row: &Row) -> Self {
        let text = |key: &str| match row.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Self {
            id: row.get("id").and_then(value_as_i64),
            title: text("title").unwrap_or_default(),
            content: text("content").unwrap_or_default(),
            created_at: text("created_at"),
        }
    }

    /// Newest first by `created_at`, then by id; undated rows last.
    pub fn sort_newest_first(items: &mut [Announcement]) {
        items.sort_by(|a, b| {
            let a_at = a.created_at.as_deref().and_then(parse_timestamp);
            let b_at = b.created_at.as_deref().and_then(parse_timestamp);
            b_at.cmp(&a_at).then_with(|| b.id.cmp(&a.id))
        });
    }
}

/// Title and content as submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementDraft {
    pub title: String,
    pub content: String,
}

impl AnnouncementDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Trims both fields and checks they are non-blank and within bounds.
    pub fn validated(self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation("Title must not be empty".into()));
        }
        if content.is_empty() {
            return Err(DomainError::Validation("Content must not be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(DomainError::Validation(format!(
                "Content must be at most {} characters",
                MAX_CONTENT_LEN
            )));
        }
        Ok(Self { title, content })
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("title".into(), Value::String(self.title.clone()));
        row.insert("content".into(), Value::String(self.content.clone()));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_row_tolerates_missing_fields() {
        let row = json!({"id": 3, "title": "Hi"}).as_object().cloned().unwrap();
        let a = Announcement::from_row(&row);
        assert_eq!(a.id, Some(3));
        assert_eq!(a.title, "Hi");
        assert_eq!(a.content, "");
        assert_eq!(a.created_at, None);
    }

    #[test]
    fn test_sort_newest_first() {
        let mk = |id, at: Option<&str>| Announcement {
            id: Some(id),
            title: String::new(),
            content: String::new(),
            created_at: at.map(str::to_string),
        };
        let mut items = vec![
            mk(1, Some("2024-01-01T00:00:00Z")),
            mk(2, None),
            mk(3, Some("2024-03-01T00:00:00+00:00")),
            mk(4, Some("2024-03-01T00:00:00Z")),
        ];
        Announcement::sort_newest_first(&mut items);
        let ids: Vec<i64> = items.iter().filter_map(|a| a.id).collect();
        assert_eq!(ids, vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_draft_validation() {
        let ok = AnnouncementDraft::new("  Title ", " Body ").validated().unwrap();
        assert_eq!(ok, AnnouncementDraft::new("Title", "Body"));

        assert!(AnnouncementDraft::new("   ", "x").validated().is_err());
        assert!(AnnouncementDraft::new("x", "").validated().is_err());
        assert!(AnnouncementDraft::new("x".repeat(201), "y").validated().is_err());
        assert!(AnnouncementDraft::new("x", "y".repeat(5001)).validated().is_err());
    }
}
