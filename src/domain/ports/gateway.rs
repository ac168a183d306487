use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::query::{CountQuery, Filter, Row, SelectQuery};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The table (relation) has not been created on the backend.
    #[error("relation \"{table}\" does not exist")]
    RelationMissing { table: String },

    #[error("{message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_relation_missing(&self) -> bool {
        matches!(self, Self::RelationMissing { .. })
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Table-scoped access to the hosted relational backend.
///
/// Every call is a single round trip; there are no transactions and no
/// snapshot consistency between calls.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Short adapter name used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn select(&self, query: &SelectQuery) -> GatewayResult<Vec<Row>>;

    async fn count(&self, query: &CountQuery) -> GatewayResult<u64>;

    /// Insert rows and return them as stored (with backend defaults applied).
    async fn insert(&self, table: &str, rows: Vec<Row>) -> GatewayResult<Vec<Row>>;

    /// Apply `patch` to every row matching all `filters`; returns the updated rows.
    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> GatewayResult<Vec<Row>>;

    /// Delete every row matching all `filters`; returns the deleted rows.
    async fn delete(&self, table: &str, filters: &[Filter]) -> GatewayResult<Vec<Row>>;

    /// Cheap reachability probe.
    async fn ping(&self) -> GatewayResult<()>;
}

pub type SharedGateway = Arc<dyn TableGateway>;

/// Unfiltered writes would touch the whole table; adapters refuse them.
pub fn ensure_scoped(table: &str, filters: &[Filter]) -> GatewayResult<()> {
    if filters.is_empty() {
        return Err(GatewayError::Backend {
            status: 400,
            code: None,
            message: format!("refusing to modify every row of \"{}\"", table),
        });
    }
    Ok(())
}
