//! Backend-neutral query description.
//!
//! A [`SelectQuery`] describes one round trip against a named table: the
//! projection (optionally embedding one level of related tables), comparison
//! filters, an OR'd case-insensitive text search, ordering and a row window.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One backend row, as returned by the hosted database.
pub type Row = Map<String, Value>;

/// Resolve a dotted path (`patients.first_name`) inside a row.
///
/// Embedded relations may be returned either as an object (to-one) or as a
/// single-element array; both are followed.
pub fn lookup<'a>(row: &'a Row, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = row.get(first)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.first()?.as_object()?.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Lenient numeric read: JSON numbers and numeric strings.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Lenient integer read: integral JSON numbers and numeric strings.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

// ── Projection ─────────────────────────────────────────────────

/// Columns selected from the base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    All,
    Only(Vec<String>),
}

/// A one-level embedded relation, e.g. `patients(first_name,last_name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub columns: Columns,
    pub embeds: Vec<Embed>,
}

impl Projection {
    /// `*`
    pub fn all() -> Self {
        Self {
            columns: Columns::All,
            embeds: Vec::new(),
        }
    }

    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Columns::Only(columns.into_iter().map(Into::into).collect()),
            embeds: Vec::new(),
        }
    }

    pub fn embed<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embeds.push(Embed {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

// ── Filters ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    /// Case-sensitive pattern, `%` and `_` wildcards.
    Like,
    /// Case-insensitive pattern, `%` and `_` wildcards.
    ILike,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::ILike => "ilike",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Gte, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Lte, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Like, Value::String(pattern.into()))
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOp::ILike, Value::String(pattern.into()))
    }
}

/// Escape LIKE wildcards so `input` matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// OR of `ilike %text%` predicates across `columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub text: String,
    pub columns: Vec<String>,
}

impl TextSearch {
    /// `None` when there is nothing to search for or nowhere to search.
    pub fn new<I, S>(text: &str, columns: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            columns,
        })
    }
}

// ── Ordering & window ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Plain column, or `relation.column` to order by an embedded table.
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// `Some((relation, column))` for a dotted path.
    pub fn referenced(&self) -> Option<(&str, &str)> {
        self.column.split_once('.')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: u64,
    pub limit: u64,
}

// ── Queries ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub projection: Projection,
    pub filters: Vec<Filter>,
    pub search: Option<TextSearch>,
    pub sort: Option<SortSpec>,
    pub range: Option<RowRange>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Projection::all(),
            filters: Vec::new(),
            search: None,
            sort: None,
            range: None,
        }
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn search(mut self, search: Option<TextSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// Row-count strategy, mirroring PostgREST's `Prefer: count=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    #[default]
    Exact,
    Planned,
    Estimated,
}

impl CountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Planned => "planned",
            Self::Estimated => "estimated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountQuery {
    pub table: String,
    pub filters: Vec<Filter>,
    pub search: Option<TextSearch>,
    pub mode: CountMode,
}

impl CountQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            search: None,
            mode: CountMode::Exact,
        }
    }

    pub fn filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn search(mut self, search: Option<TextSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn mode(mut self, mode: CountMode) -> Self {
        self.mode = mode;
        self
    }
}
