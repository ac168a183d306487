//! # Hospital Staff Portal
//!
//! Role-gated internal portal for hospital staff. Employees sign in with
//! their work email; their department decides which record tables they may
//! browse, and executives additionally get analytics, the data explorer and
//! announcement management. All data lives in a hosted PostgREST backend
//! (or an in-memory stand-in for development).
//!
//! ## Architecture
//!
//! - **domain**: departments, access policy, navigation state, analytics
//!   rollups and the table-gateway port
//! - **application**: use cases (sign-in, browsing, dashboard, analytics,
//!   announcements) over the gateway
//! - **infrastructure**: PostgREST and in-memory gateways, repositories,
//!   session tokens, demo seeder
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime lifecycle shared by the CLI and tests

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, CONFIG_ENV};

pub use interfaces::{create_api_router, AppState};
