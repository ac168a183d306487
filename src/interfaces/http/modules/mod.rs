pub mod analytics;
pub mod announcements;
pub mod auth;
pub mod dashboard;
pub mod departments;
pub mod explorer;
pub mod health;
pub mod metrics;
pub mod navigation;
pub mod request_id;
