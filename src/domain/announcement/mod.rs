//! Announcement aggregate
//!
//! Portal-wide notices, keyed by their backend id.

pub mod model;
pub mod repository;

pub use model::{Announcement, AnnouncementDraft, MAX_CONTENT_LEN, MAX_TITLE_LEN};
pub use repository::AnnouncementRepository;
