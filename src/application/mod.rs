//! Application layer - use cases over the domain and the table gateway
//!
//! - `records`: paged list, count and sum facade
//! - `identity`: sign-in and the session registry
//! - `departments`: department pages and the data explorer
//! - `dashboard`, `analytics`, `announcements`: the remaining portal pages

pub mod analytics;
pub mod announcements;
pub mod dashboard;
pub mod departments;
pub mod identity;
pub mod records;

pub use analytics::AnalyticsService;
pub use announcements::AnnouncementService;
pub use dashboard::DashboardService;
pub use departments::{
    BrowseRequest, ColumnInfo, DepartmentCard, DepartmentService, ExplorerTable, RecordPage,
};
pub use identity::{LoginOutcome, SessionRegistry, SessionService, SharedSessionRegistry};
pub use records::RecordService;
