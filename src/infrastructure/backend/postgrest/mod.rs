//! PostgREST adapter for the hosted backend (Supabase and compatible).

mod client;
mod error;
mod query;

pub use client::{PostgrestGateway, PostgrestSettings};
