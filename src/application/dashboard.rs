//! Dashboard headline metrics

use tracing::error;

use super::records::RecordService;
use crate::domain::dashboard::FactMetrics;
use crate::domain::department::tables;
use crate::domain::ports::Filter;
use crate::domain::DomainResult;

#[derive(Clone)]
pub struct DashboardService {
    records: RecordService,
}

impl DashboardService {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }

    async fn read(&self) -> DomainResult<FactMetrics> {
        let (total_employees, patients_admitted, pending_bills, medicine_stock, appointments_scheduled) = tokio::try_join!(
            self.records.count(tables::EMPLOYEES, Vec::new(), None),
            self.records.count(tables::PATIENTS, Vec::new(), None),
            self.records.count(
                tables::BILLING,
                vec![Filter::eq("payment_status", "Pending")],
                None
            ),
            self.records.sum(tables::MEDICATIONS, "quantity_stock"),
            self.records.count(
                tables::APPOINTMENTS,
                vec![Filter::eq("status", "Scheduled")],
                None
            ),
        )?;
        Ok(FactMetrics {
            total_employees,
            patients_admitted,
            pending_bills,
            medicine_stock,
            appointments_scheduled,
            available: true,
        })
    }

    /// The five counters. A failed read zeroes them all and clears `available`.
    pub async fn metrics(&self) -> FactMetrics {
        match self.read().await {
            Ok(metrics) => metrics,
            Err(e) => {
                error!(error = %e, "Failed to load dashboard metrics");
                FactMetrics::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{
        CountMode, CountQuery, GatewayError, GatewayResult, Row, SelectQuery, TableGateway,
    };
    use crate::infrastructure::backend::InMemoryGateway;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_metrics_from_tables() {
        let gateway = InMemoryGateway::with_portal_schema();
        gateway
            .insert("employees", vec![row(json!({"full_name": "A"})), row(json!({"full_name": "B"}))])
            .await
            .unwrap();
        gateway
            .insert(
                "billing_and_insurance",
                vec![
                    row(json!({"payment_status": "Pending"})),
                    row(json!({"payment_status": "Paid"})),
                ],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "medications",
                vec![row(json!({"quantity_stock": 40})), row(json!({"quantity_stock": "2"}))],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "appointments",
                vec![row(json!({"status": "Scheduled"})), row(json!({"status": "Completed"}))],
            )
            .await
            .unwrap();
        let svc = DashboardService::new(RecordService::new(Arc::new(gateway), CountMode::Exact));

        let metrics = svc.metrics().await;
        assert_eq!(
            metrics,
            FactMetrics {
                total_employees: 2,
                patients_admitted: 0,
                pending_bills: 1,
                medicine_stock: 42.0,
                appointments_scheduled: 1,
                available: true,
            }
        );
    }

    struct Failing;

    #[async_trait]
    impl TableGateway for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn select(&self, _: &SelectQuery) -> GatewayResult<Vec<Row>> {
            Err(GatewayError::Transport("connection refused".into()))
        }
        async fn count(&self, _: &CountQuery) -> GatewayResult<u64> {
            Err(GatewayError::Transport("connection refused".into()))
        }
        async fn insert(&self, _: &str, _: Vec<Row>) -> GatewayResult<Vec<Row>> {
            unreachable!()
        }
        async fn update(&self, _: &str, _: &[Filter], _: Row) -> GatewayResult<Vec<Row>> {
            unreachable!()
        }
        async fn delete(&self, _: &str, _: &[Filter]) -> GatewayResult<Vec<Row>> {
            unreachable!()
        }
        async fn ping(&self) -> GatewayResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_backend_failure_yields_unavailable_zeros() {
        let svc = DashboardService::new(RecordService::new(Arc::new(Failing), CountMode::Exact));
        let metrics = svc.metrics().await;
        assert!(!metrics.available);
        assert_eq!(metrics.total_employees, 0);
        assert_eq!(metrics.medicine_stock, 0.0);
    }

    #[tokio::test]
    async fn test_missing_tables_count_zero() {
        let gateway = InMemoryGateway::new();
        let svc = DashboardService::new(RecordService::new(Arc::new(gateway), CountMode::Exact));
        let metrics = svc.metrics().await;
        assert!(metrics.available);
        assert_eq!(metrics.pending_bills, 0);
    }
}
