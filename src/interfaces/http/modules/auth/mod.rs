//! Authentication module: login, logout, current session

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
