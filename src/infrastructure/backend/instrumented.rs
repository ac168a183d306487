//! Metrics decorator for any [`TableGateway`].
//!
//! Records `backend_requests_total{table,op,outcome}` and
//! `backend_request_duration_seconds{table,op}` around every call.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;

use crate::domain::ports::{
    CountQuery, Filter, GatewayError, GatewayResult, Row, SelectQuery, SharedGateway, TableGateway,
};

pub struct InstrumentedGateway {
    inner: SharedGateway,
}

impl InstrumentedGateway {
    pub fn new(inner: SharedGateway) -> Self {
        Self { inner }
    }
}

fn outcome<T>(result: &GatewayResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(GatewayError::RelationMissing { .. }) => "missing",
        Err(_) => "error",
    }
}

async fn observe<T, F>(table: &str, op: &'static str, call: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    let start = Instant::now();
    let result = call.await;
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        "backend_requests_total",
        "table" => table.to_string(),
        "op" => op,
        "outcome" => outcome(&result)
    )
    .increment(1);
    metrics::histogram!(
        "backend_request_duration_seconds",
        "table" => table.to_string(),
        "op" => op
    )
    .record(elapsed);

    if let Err(e) = &result {
        tracing::debug!(table, op, error = %e, "backend call failed");
    }
    result
}

#[async_trait]
impl TableGateway for InstrumentedGateway {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn select(&self, query: &SelectQuery) -> GatewayResult<Vec<Row>> {
        observe(&query.table, "select", self.inner.select(query)).await
    }

    async fn count(&self, query: &CountQuery) -> GatewayResult<u64> {
        observe(&query.table, "count", self.inner.count(query)).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> GatewayResult<Vec<Row>> {
        observe(table, "insert", self.inner.insert(table, rows)).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> GatewayResult<Vec<Row>> {
        observe(table, "update", self.inner.update(table, filters, patch)).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> GatewayResult<Vec<Row>> {
        observe(table, "delete", self.inner.delete(table, filters)).await
    }

    async fn ping(&self) -> GatewayResult<()> {
        observe("", "ping", self.inner.ping()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::backend::memory::InMemoryGateway;

    #[tokio::test]
    async fn test_passes_results_through() {
        let gateway = InstrumentedGateway::new(Arc::new(InMemoryGateway::with_portal_schema()));
        assert_eq!(gateway.name(), "memory");
        assert_eq!(gateway.count(&CountQuery::new("patients")).await.unwrap(), 0);
        let err = gateway.count(&CountQuery::new("ghost")).await.unwrap_err();
        assert!(err.is_relation_missing());
        assert_eq!(outcome::<()>(&Err(err)), "missing");
    }
}
