//! Identity module: sign-in, sign-out and live sessions
//!
//! Sessions exist only in memory; a restart signs everyone out.

pub mod registry;
pub mod service;

pub use registry::{SessionRegistry, SharedSessionRegistry};
pub use service::{LoginOutcome, SessionService, USER_NOT_FOUND};
