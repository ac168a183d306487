//! Navigation: sidebar menu and guarded page transitions

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
