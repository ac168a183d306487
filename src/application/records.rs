//! Record access facade
//!
//! Paged lists, filtered counts and column sums over the table gateway.
//! Each call is one round trip; a page and its count are not a snapshot.

use tracing::warn;

use crate::domain::ports::{
    value_as_f64, CountMode, CountQuery, Filter, Projection, Row, SelectQuery, SharedGateway,
    SortSpec, TextSearch,
};
use crate::domain::{DomainError, DomainResult};
use crate::shared::PageRequest;

#[derive(Clone)]
pub struct RecordService {
    gateway: SharedGateway,
    count_mode: CountMode,
}

impl RecordService {
    pub fn new(gateway: SharedGateway, count_mode: CountMode) -> Self {
        Self {
            gateway,
            count_mode,
        }
    }

    pub fn gateway(&self) -> &SharedGateway {
        &self.gateway
    }

    /// One page of `table`. Errors, including a missing table, are reported.
    pub async fn fetch_page(
        &self,
        table: &str,
        projection: Projection,
        page: PageRequest,
        sort: Option<SortSpec>,
        search: Option<TextSearch>,
    ) -> DomainResult<Vec<Row>> {
        let query = SelectQuery::new(table)
            .project(projection)
            .search(search)
            .sort(sort)
            .range(page.range());
        self.gateway.select(&query).await.map_err(|e| {
            DomainError::Backend(format!(
                "Failed to fetch data from {}. Error: {}. Please ensure the table exists and that Row Level Security (RLS) policies allow read access.",
                table, e
            ))
        })
    }

    /// Every row of `table` matching `filters`. A missing table reads as empty.
    pub async fn fetch_all(
        &self,
        table: &str,
        projection: Projection,
        filters: Vec<Filter>,
    ) -> DomainResult<Vec<Row>> {
        let mut query = SelectQuery::new(table).project(projection);
        query.filters = filters;
        match self.gateway.select(&query).await {
            Ok(rows) => Ok(rows),
            Err(e) if e.is_relation_missing() => {
                warn!(table, "table not found, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(DomainError::Backend(format!(
                "Failed to fetch data from {}. Error: {}.",
                table, e
            ))),
        }
    }

    /// Rows matching all `filters` and the search. A missing table counts 0.
    pub async fn count(
        &self,
        table: &str,
        filters: Vec<Filter>,
        search: Option<TextSearch>,
    ) -> DomainResult<u64> {
        let query = CountQuery::new(table)
            .filters(filters)
            .search(search)
            .mode(self.count_mode);
        match self.gateway.count(&query).await {
            Ok(n) => Ok(n),
            Err(e) if e.is_relation_missing() => {
                warn!(table, "table not found, counting 0");
                Ok(0)
            }
            Err(e) => Err(DomainError::Backend(format!(
                "Failed to count data from {}. Error: {}.",
                table, e
            ))),
        }
    }

    /// Client-side sum of `column`; null and non-numeric cells add 0.
    pub async fn sum(&self, table: &str, column: &str) -> DomainResult<f64> {
        let query = SelectQuery::new(table).project(Projection::columns([column]));
        match self.gateway.select(&query).await {
            Ok(rows) => Ok(rows
                .iter()
                .filter_map(|row| row.get(column).and_then(value_as_f64))
                .sum()),
            Err(e) if e.is_relation_missing() => {
                warn!(table, "table not found, summing to 0");
                Ok(0.0)
            }
            Err(e) => Err(DomainError::Backend(format!(
                "Failed to fetch data for sum from {}. Error: {}.",
                table, e
            ))),
        }
    }
}
