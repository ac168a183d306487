//! In-memory table gateway for development, demos and tests.
//!
//! Tables must be registered before use; a query against an unregistered
//! table fails with [`GatewayError::RelationMissing`] just like the hosted
//! backend does. Embeds resolve many-to-one: the embedded table's primary
//! key column is looked up on the base row.

mod eval;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::domain::department::tables;
use crate::domain::ports::{
    ensure_scoped, value_as_i64, Columns, CountQuery, Embed, Filter, GatewayError, GatewayResult,
    Row, SelectQuery, TableGateway, TextSearch,
};

struct MemoryTable {
    primary_key: String,
    /// Filled with the insert time when absent.
    created_column: Option<String>,
    rows: Vec<Row>,
    next_id: i64,
}

pub struct InMemoryGateway {
    tables: DashMap<String, MemoryTable>,
}

impl InMemoryGateway {
    /// An empty gateway with no tables.
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Every table the portal reads, registered and empty.
    pub fn with_portal_schema() -> Self {
        let gateway = Self::new();
        gateway.create_table(tables::EMPLOYEES, "employee_id", None);
        gateway.create_table(tables::PATIENTS, "patient_id", None);
        gateway.create_table(tables::BILLING, "billing_id", None);
        gateway.create_table(tables::MEDICATIONS, "medication_id", None);
        gateway.create_table(tables::APPOINTMENTS, "appt_id", None);
        gateway.create_table(tables::PRESCRIPTIONS, "prescription_id", None);
        gateway.create_table(tables::ANNOUNCEMENTS, "id", Some("created_at"));
        gateway
    }

    /// Register `name`. Re-registering an existing table keeps its rows.
    pub fn create_table(&self, name: &str, primary_key: &str, created_column: Option<&str>) {
        self.tables.entry(name.to_string()).or_insert_with(|| MemoryTable {
            primary_key: primary_key.to_string(),
            created_column: created_column.map(str::to_string),
            rows: Vec::new(),
            next_id: 1,
        });
    }

    pub fn drop_table(&self, name: &str) {
        self.tables.remove(name);
    }

    fn missing(table: &str) -> GatewayError {
        GatewayError::RelationMissing {
            table: table.to_string(),
        }
    }

    fn snapshot(&self, table: &str) -> GatewayResult<Vec<Row>> {
        self.tables
            .get(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| Self::missing(table))
    }

    /// Attach each embed as an object (or null) keyed by the embedded table.
    fn embed(&self, rows: &mut [Row], embeds: &[Embed]) -> GatewayResult<()> {
        for embed in embeds {
            let (primary_key, related) = {
                let table = self.tables.get(&embed.table).ok_or_else(|| GatewayError::Backend {
                    status: 400,
                    code: Some("PGRST200".into()),
                    message: format!("Could not find a relationship for '{}'", embed.table),
                })?;
                (table.primary_key.clone(), table.rows.clone())
            };
            for row in rows.iter_mut() {
                let target = row
                    .get(&primary_key)
                    .and_then(|key| {
                        related
                            .iter()
                            .find(|r| r.get(&primary_key).is_some_and(|k| same_key(k, key)))
                    })
                    .map(|r| Value::Object(project(r, &embed.columns)))
                    .unwrap_or(Value::Null);
                row.insert(embed.table.clone(), target);
            }
        }
        Ok(())
    }

    fn matching(rows: Vec<Row>, filters: &[Filter], search: Option<&TextSearch>) -> Vec<Row> {
        rows.into_iter()
            .filter(|row| filters.iter().all(|f| eval::matches_filter(row, f)))
            .filter(|row| search.map_or(true, |s| eval::matches_search(row, s)))
            .collect()
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn same_key(a: &Value, b: &Value) -> bool {
    eval::equals(a, b)
}

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    columns
        .iter()
        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
        .collect()
}

#[async_trait]
impl TableGateway for InMemoryGateway {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, query: &SelectQuery) -> GatewayResult<Vec<Row>> {
        let mut rows = self.snapshot(&query.table)?;
        self.embed(&mut rows, &query.projection.embeds)?;
        let mut rows = Self::matching(rows, &query.filters, query.search.as_ref());

        if let Some(sort) = &query.sort {
            eval::order_rows(&mut rows, &sort.column, sort.direction);
        }
        if let Some(range) = query.range {
            rows = rows
                .into_iter()
                .skip(range.offset as usize)
                .take(range.limit as usize)
                .collect();
        }
        if let Columns::Only(columns) = &query.projection.columns {
            let embedded: Vec<&String> = query.projection.embeds.iter().map(|e| &e.table).collect();
            for row in rows.iter_mut() {
                row.retain(|key, _| columns.contains(key) || embedded.contains(&key));
            }
        }
        debug!(table = %query.table, rows = rows.len(), "memory select");
        Ok(rows)
    }

    async fn count(&self, query: &CountQuery) -> GatewayResult<u64> {
        let mut rows = self.snapshot(&query.table)?;
        // Search may reference embedded columns; resolve the relations it names.
        if let Some(search) = &query.search {
            let embeds: Vec<Embed> = search
                .columns
                .iter()
                .filter_map(|c| c.split_once('.'))
                .map(|(table, _)| Embed {
                    table: table.to_string(),
                    columns: Vec::new(),
                })
                .fold(Vec::new(), |mut acc, e| {
                    if !acc.contains(&e) {
                        acc.push(e);
                    }
                    acc
                });
            self.embed(&mut rows, &embeds)?;
        }
        Ok(Self::matching(rows, &query.filters, query.search.as_ref()).len() as u64)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> GatewayResult<Vec<Row>> {
        let mut entry = self.tables.get_mut(table).ok_or_else(|| Self::missing(table))?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            let key = entry.primary_key.clone();
            match row.get(&key).and_then(value_as_i64) {
                Some(id) => entry.next_id = entry.next_id.max(id.saturating_add(1)),
                None => {
                    row.insert(key, Value::from(entry.next_id));
                    entry.next_id += 1;
                }
            }
            if let Some(column) = entry.created_column.clone() {
                row.entry(column).or_insert_with(|| Value::String(now.clone()));
            }
            entry.rows.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> GatewayResult<Vec<Row>> {
        ensure_scoped(table, filters)?;
        let mut entry = self.tables.get_mut(table).ok_or_else(|| Self::missing(table))?;
        let mut updated = Vec::new();
        for row in entry.rows.iter_mut() {
            if filters.iter().all(|f| eval::matches_filter(row, f)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> GatewayResult<Vec<Row>> {
        ensure_scoped(table, filters)?;
        let mut entry = self.tables.get_mut(table).ok_or_else(|| Self::missing(table))?;
        let (deleted, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut entry.rows)
            .into_iter()
            .partition(|row| filters.iter().all(|f| eval::matches_filter(row, f)));
        entry.rows = kept;
        Ok(deleted)
    }

    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }
}
