use async_trait::async_trait;

use crate::domain::department::tables;
use crate::domain::ports::{escape_like, Filter, Projection, RowRange, SelectQuery, SharedGateway};
use crate::domain::{DomainResult, Employee, EmployeeDirectory};

use super::backend_err;

/// [`EmployeeDirectory`] over the `employees` table.
pub struct EmployeeTable {
    gateway: SharedGateway,
}

impl EmployeeTable {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl EmployeeDirectory for EmployeeTable {
    async fn find_by_email(&self, email: &str) -> DomainResult<Vec<Employee>> {
        let query = SelectQuery::new(tables::EMPLOYEES)
            .project(Projection::columns([
                "employee_id",
                "full_name",
                "email",
                "department_name",
                "job_title",
            ]))
            .filter(Filter::ilike("email", escape_like(email)))
            .range(RowRange {
                offset: 0,
                limit: 2,
            });
        let rows = self.gateway.select(&query).await.map_err(backend_err)?;
        Ok(rows.iter().map(Employee::from_row).collect())
    }
}
