//! Analytics report assembly
//!
//! Five concurrent reads feed the pure rollups in `domain::analytics`.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::records::RecordService;
use crate::domain::access::{authorize, Resource};
use crate::domain::analytics::{build_report, AnalyticsInputs, AnalyticsReport};
use crate::domain::department::tables;
use crate::domain::ports::{Filter, Projection};
use crate::domain::{DomainResult, UserSession};
use crate::shared::start_of_month;

#[derive(Clone)]
pub struct AnalyticsService {
    records: RecordService,
}

impl AnalyticsService {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }

    /// Executive-only report as of `now`.
    pub async fn report_for(
        &self,
        user: &UserSession,
        now: DateTime<Utc>,
    ) -> DomainResult<AnalyticsReport> {
        authorize(Some(user.department.as_deref()), Resource::Analytics)?;
        self.report(now).await
    }

    pub async fn report(&self, now: DateTime<Utc>) -> DomainResult<AnalyticsReport> {
        let month_start = start_of_month(now);
        let since = month_start.to_rfc3339_opts(SecondsFormat::Millis, true);

        let (billing, appointments, employees, prescriptions, medications) = tokio::try_join!(
            self.records.fetch_all(
                tables::BILLING,
                Projection::all(),
                vec![Filter::gte("admission_date", since.as_str())],
            ),
            self.records.fetch_all(
                tables::APPOINTMENTS,
                Projection::all().embed(
                    tables::EMPLOYEES,
                    ["full_name", "salary", "department_name"]
                ),
                Vec::new(),
            ),
            self.records.fetch_all(
                tables::EMPLOYEES,
                Projection::columns(["employee_id", "full_name", "salary", "department_name"]),
                Vec::new(),
            ),
            self.records.fetch_all(
                tables::PRESCRIPTIONS,
                Projection::columns(["prescription_date", "medication_id"]),
                vec![Filter::gte("prescription_date", since.as_str())],
            ),
            self.records.fetch_all(
                tables::MEDICATIONS,
                Projection::columns(["medication_id", "generic_name"]),
                Vec::new(),
            ),
        )?;

        debug!(
            billing = billing.len(),
            appointments = appointments.len(),
            employees = employees.len(),
            prescriptions = prescriptions.len(),
            medications = medications.len(),
            "Building analytics report"
        );

        let inputs = AnalyticsInputs::from_rows(
            &billing,
            &appointments,
            &employees,
            &prescriptions,
            &medications,
        );
        Ok(build_report(&inputs, month_start, now))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{CountMode, Row, TableGateway};
    use crate::domain::DomainError;
    use crate::infrastructure::backend::InMemoryGateway;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn user(department: &str) -> UserSession {
        UserSession {
            name: "T".into(),
            email: "t@cloudink.hospital".into(),
            department: Some(department.into()),
            job_title: None,
        }
    }

    async fn service() -> AnalyticsService {
        let gateway = InMemoryGateway::with_portal_schema();
        gateway
            .insert(
                "employees",
                vec![
                    row(json!({"full_name": "Dr. A", "department_name": "Patient Records", "salary": 1})),
                    row(json!({"full_name": "Dr. B", "department_name": null, "salary": 1})),
                ],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "appointments",
                vec![
                    row(json!({"patient_id": 7, "employee_id": 1, "appt_datetime": "2024-03-02T09:00:00Z"})),
                    row(json!({"patient_id": 7, "employee_id": 1, "appt_datetime": "2024-03-09T09:00:00Z"})),
                    row(json!({"patient_id": 7, "employee_id": 1, "appt_datetime": "2024-03-16T09:00:00Z"})),
                    row(json!({"patient_id": 8, "employee_id": 2, "appt_datetime": "2024-01-05T09:00:00Z"})),
                    row(json!({"patient_id": 8, "employee_id": 2, "appt_datetime": "garbage"})),
                ],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "billing_and_insurance",
                vec![
                    row(json!({"patient_id": 7, "total_charges": 300, "admission_date": "2024-03-01"})),
                    row(json!({"patient_id": 7, "total_charges": 999, "admission_date": "2024-02-10"})),
                ],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "medications",
                vec![row(json!({"generic_name": "Ibuprofen"}))],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "prescriptions",
                vec![
                    row(json!({"medication_id": 1, "prescription_date": "2024-03-03T00:00:00Z"})),
                    row(json!({"medication_id": 1, "prescription_date": "2024-03-04T00:00:00Z"})),
                    row(json!({"medication_id": 9, "prescription_date": "2024-03-04T00:00:00Z"})),
                    row(json!({"medication_id": 1, "prescription_date": "2024-02-04T00:00:00Z"})),
                ],
            )
            .await
            .unwrap();
        AnalyticsService::new(RecordService::new(Arc::new(gateway), CountMode::Exact))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_report_rollups() {
        let report = service().await.report(now()).await.unwrap();
        assert_eq!(report.month_start.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let trend: Vec<(&str, u64)> = report
            .visit_trend
            .iter()
            .map(|b| (b.name.as_str(), b.count))
            .collect();
        assert_eq!(trend, vec![("Jan 2024", 1), ("Mar 2024", 3)]);

        assert_eq!(report.top_providers[0].name, "Dr. A");
        assert_eq!(report.top_providers[0].count, 3);

        let meds: Vec<(&str, u64)> = report
            .top_medications
            .iter()
            .map(|m| (m.name.as_str(), m.count))
            .collect();
        assert_eq!(meds, vec![("Ibuprofen", 2), ("Unknown Med (ID: 9)", 1)]);

        let records = &report.department_matrix[0];
        assert_eq!(records.department, "Patient Records");
        assert_eq!(records.appts, 3);
        assert_eq!(records.unique_patients, 1);
        assert_eq!(records.revenue, 300);
        assert_eq!(records.efficiency, 300);

        let unassigned = report
            .department_matrix
            .iter()
            .find(|d| d.department == "Unassigned")
            .unwrap();
        assert_eq!(unassigned.staff, 1);
        assert_eq!(unassigned.revenue, 0);
    }

    #[tokio::test]
    async fn test_report_requires_executive() {
        let svc = service().await;
        let err = svc.report_for(&user("Patient Records"), now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(
            err.to_string(),
            "Access Denied: Only Executive staff can access Analytics."
        );
        assert!(svc.report_for(&user("Executive Board"), now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_prescriptions_table() {
        let gateway = InMemoryGateway::with_portal_schema();
        gateway.drop_table("prescriptions");
        let svc = AnalyticsService::new(RecordService::new(Arc::new(gateway), CountMode::Exact));
        let report = svc.report(now()).await.unwrap();
        assert!(report.top_medications.is_empty());
        assert!(report.department_matrix.is_empty());
    }
}
