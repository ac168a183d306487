//! Outbound ports: the data-access seam towards the hosted backend.

pub mod gateway;
pub mod query;

pub use gateway::*;
pub use query::*;
