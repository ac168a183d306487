//! Announcements: portal notices, readable by all, managed by executives

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
