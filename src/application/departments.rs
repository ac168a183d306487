//! Department browsing and the data explorer
//!
//! Both read through [`RecordService`] after the access policy has passed:
//! a department page needs that department (or executive rank), the
//! explorer needs executive rank.

use serde::Serialize;
use utoipa::ToSchema;

use super::records::RecordService;
use crate::domain::access::{authorize, is_authorized, Resource};
use crate::domain::ports::{Row, SortSpec, TextSearch};
use crate::domain::{Department, DomainError, DomainResult, TableConfig, UserSession};
use crate::shared::{PageRequest, PaginatedResult};

/// A department tile as shown on the dashboard and department index.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentCard {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub table: String,
    /// Whether the signed-in user may open this department.
    pub authorized: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ColumnInfo {
    pub header: String,
    /// Row key; dotted for embedded columns.
    pub key: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExplorerTable {
    pub table: String,
    /// Department the table backs.
    pub department: String,
    pub columns: Vec<ColumnInfo>,
}

/// Browse parameters after HTTP-level parsing.
#[derive(Debug, Clone, Default)]
pub struct BrowseRequest {
    pub page: PageRequest,
    pub sort: Option<SortSpec>,
    pub search: Option<String>,
}

/// One page of records plus what the client needs to render it.
#[derive(Debug)]
pub struct RecordPage {
    pub table: &'static str,
    pub columns: Vec<ColumnInfo>,
    pub rows: PaginatedResult<Row>,
}

fn columns(config: &TableConfig) -> Vec<ColumnInfo> {
    config
        .columns
        .iter()
        .map(|c| ColumnInfo {
            header: c.header.to_string(),
            key: c.key.to_string(),
        })
        .collect()
}

fn department_for(config: &TableConfig) -> Option<Department> {
    Department::ALL
        .into_iter()
        .find(|d| d.table_config().table == config.table)
}

#[derive(Clone)]
pub struct DepartmentService {
    records: RecordService,
}

impl DepartmentService {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }

    /// All five departments with the caller's access flag.
    pub fn cards(&self, user: &UserSession) -> Vec<DepartmentCard> {
        Department::ALL
            .into_iter()
            .map(|d| DepartmentCard {
                name: d.label().to_string(),
                slug: d.slug().to_string(),
                description: d.description().to_string(),
                icon: d.icon().to_string(),
                table: d.table_config().table.to_string(),
                authorized: is_authorized(user.department.as_deref(), Resource::Department(d)),
            })
            .collect()
    }

    pub async fn browse(
        &self,
        user: &UserSession,
        department: Department,
        request: BrowseRequest,
    ) -> DomainResult<RecordPage> {
        authorize(
            Some(user.department.as_deref()),
            Resource::Department(department),
        )?;
        self.page_of(department.table_config(), request).await
    }

    /// Distinct tables behind the departments (executives only).
    pub fn explorer_tables(&self, user: &UserSession) -> DomainResult<Vec<ExplorerTable>> {
        authorize(Some(user.department.as_deref()), Resource::DataExplorer)?;
        Ok(TableConfig::all()
            .into_iter()
            .map(|config| ExplorerTable {
                table: config.table.to_string(),
                department: department_for(config)
                    .map(|d| d.label().to_string())
                    .unwrap_or_default(),
                columns: columns(config),
            })
            .collect())
    }

    pub async fn explore(
        &self,
        user: &UserSession,
        table: &str,
        request: BrowseRequest,
    ) -> DomainResult<RecordPage> {
        authorize(Some(user.department.as_deref()), Resource::DataExplorer)?;
        let config = TableConfig::by_table(table)
            .ok_or_else(|| DomainError::NotFound(format!("table \"{}\"", table)))?;
        self.page_of(config, request).await
    }

    async fn page_of(
        &self,
        config: &'static TableConfig,
        request: BrowseRequest,
    ) -> DomainResult<RecordPage> {
        if let Some(sort) = &request.sort {
            if !config.is_sortable(&sort.column) {
                return Err(DomainError::Validation(format!(
                    "Cannot sort {} by \"{}\"",
                    config.table, sort.column
                )));
            }
        }
        let search = request
            .search
            .as_deref()
            .and_then(|text| TextSearch::new(text, config.searchable.iter().copied()));

        let (rows, total) = tokio::try_join!(
            self.records.fetch_page(
                config.table,
                config.projection(),
                request.page,
                request.sort.clone(),
                search.clone(),
            ),
            self.records.count(config.table, Vec::new(), search.clone()),
        )?;

        Ok(RecordPage {
            table: config.table,
            columns: columns(config),
            rows: PaginatedResult::new(rows, total, request.page.page, request.page.page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::ports::{CountMode, SortDirection, TableGateway};
    use crate::infrastructure::backend::InMemoryGateway;

    fn user(department: &str) -> UserSession {
        UserSession {
            name: "Test".into(),
            email: "t@cloudink.hospital".into(),
            department: Some(department.into()),
            job_title: None,
        }
    }

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn service() -> DepartmentService {
        let gateway = InMemoryGateway::with_portal_schema();
        gateway
            .insert(
                "patients",
                vec![
                    row(json!({"first_name": "Ada", "last_name": "Zed"})),
                    row(json!({"first_name": "Bea", "last_name": "Young"})),
                ],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "employees",
                vec![row(json!({"full_name": "Dr. Who", "department_name": "Patient Records"}))],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "appointments",
                vec![
                    row(json!({"patient_id": 1, "employee_id": 1, "status": "Scheduled"})),
                    row(json!({"patient_id": 2, "employee_id": 1, "status": "Completed"})),
                    row(json!({"patient_id": 2, "employee_id": null, "status": "Scheduled"})),
                ],
            )
            .await
            .unwrap();
        DepartmentService::new(RecordService::new(Arc::new(gateway), CountMode::Exact))
    }

    #[tokio::test]
    async fn test_cards_flag_access() {
        let svc = service().await;
        let cards = svc.cards(&user("Pharmacy and Inventory"));
        assert_eq!(cards.len(), 5);
        let open: Vec<&str> = cards
            .iter()
            .filter(|c| c.authorized)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(open, vec!["Pharmacy and Inventory"]);
        assert!(svc.cards(&user("Executive Office")).iter().all(|c| c.authorized));
    }

    #[tokio::test]
    async fn test_browse_denied_for_other_department() {
        let svc = service().await;
        let err = svc
            .browse(
                &user("Billing and Insurance"),
                Department::PatientRecords,
                BrowseRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(
            err.to_string(),
            "Access Denied: You do not have permission to view this department."
        );
    }

    #[tokio::test]
    async fn test_browse_sorts_by_embedded_column_and_searches() {
        let svc = service().await;
        let request = BrowseRequest {
            sort: Some(SortSpec::new("patients.last_name", SortDirection::Asc)),
            ..BrowseRequest::default()
        };
        let page = svc
            .browse(&user(" patient records "), Department::Appointments, request)
            .await
            .unwrap();
        assert_eq!(page.rows.total, 3);
        assert_eq!(page.rows.items[0]["patients"]["last_name"], json!("Young"));

        let request = BrowseRequest {
            search: Some("who".into()),
            ..BrowseRequest::default()
        };
        let page = svc
            .browse(&user("Administration"), Department::Appointments, request)
            .await
            .unwrap();
        assert_eq!(page.rows.total, 2);
        assert_eq!(page.rows.items.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_sort_column_rejected() {
        let svc = service().await;
        let request = BrowseRequest {
            sort: Some(SortSpec::new("salary; drop", SortDirection::Asc)),
            ..BrowseRequest::default()
        };
        let err = svc
            .browse(&user("Patient Records"), Department::PatientRecords, request)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_explorer_is_executive_only() {
        let svc = service().await;
        assert!(svc.explorer_tables(&user("Patient Records")).is_err());
        let tables = svc.explorer_tables(&user("Management")).unwrap();
        assert_eq!(tables.len(), 5);
        assert_eq!(tables[0].department, "Patient Records");

        let page = svc
            .explore(&user("Management"), "patients", BrowseRequest::default())
            .await
            .unwrap();
        assert_eq!(page.rows.total, 2);
        assert!(matches!(
            svc.explore(&user("Management"), "announcements", BrowseRequest::default())
                .await,
            Err(DomainError::NotFound(_))
        ));
    }
}
