//! Infrastructure layer - external concerns
//!
//! - `backend`: table gateway adapters (PostgREST, in-memory) and the seeder
//! - `repositories`: domain repositories built on the gateway
//! - `crypto`: session tokens

pub mod backend;
pub mod crypto;
pub mod repositories;

pub use backend::{build_gateway, DemoSeeder, InMemoryGateway, SeedReport};
pub use repositories::{AnnouncementStore, EmployeeTable};
