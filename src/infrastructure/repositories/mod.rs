//! Gateway-backed implementations of the domain repository traits

pub mod announcements;
pub mod employees;

pub use announcements::AnnouncementStore;
pub use employees::EmployeeTable;

use crate::domain::ports::GatewayError;
use crate::domain::DomainError;

fn backend_err(e: GatewayError) -> DomainError {
    DomainError::Backend(e.to_string())
}
