pub mod access;
pub mod analytics;
pub mod announcement;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod navigation;
pub mod ports;
pub mod session;

// Re-export commonly used types
pub use announcement::{Announcement, AnnouncementDraft, AnnouncementRepository};
pub use department::{Department, TableConfig};
pub use employee::{Employee, EmployeeDirectory};
pub use session::UserSession;

pub use crate::shared::{DomainError, DomainResult};
