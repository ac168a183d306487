//! Employee directory
//!
//! The subset of `employees` the portal needs to sign someone in.

use async_trait::async_trait;

use crate::domain::ports::{lookup, value_as_i64, Row};
use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub employee_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub department_name: Option<String>,
    pub job_title: Option<String>,
}

impl Employee {
    pub fn from_row(row: &Row) -> Self {
        let text = |key: &str| {
            lookup(row, key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        Self {
            employee_id: lookup(row, "employee_id").and_then(value_as_i64),
            full_name: text("full_name").unwrap_or_default(),
            email: text("email").unwrap_or_default(),
            department_name: text("department_name"),
            job_title: text("job_title"),
        }
    }
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Case-insensitive exact email match. At most two rows are returned,
    /// which is enough for the caller to detect an ambiguous identity.
    async fn find_by_email(&self, email: &str) -> DomainResult<Vec<Employee>>;
}
