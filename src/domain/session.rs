use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::access;

/// The signed-in employee, as resolved from the employee directory at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSession {
    pub name: String,
    pub email: String,
    /// Raw `department_name`; may name a department outside the catalogue
    /// (e.g. "Administration").
    pub department: Option<String>,
    pub job_title: Option<String>,
}

impl UserSession {
    pub fn is_executive(&self) -> bool {
        access::is_executive(self.department.as_deref())
    }
}
