//! Department pages: tiles and per-department record lists

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
