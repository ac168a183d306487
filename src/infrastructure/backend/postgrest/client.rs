//! Reqwest-backed PostgREST gateway.
//!
//! Owns transport details only: URL parameters, auth headers, count
//! negotiation and status mapping. One HTTP round trip per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION, CONTENT_RANGE,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::debug;

use super::error::{map_status_error, map_transport_error};
use super::query::{
    is_valid_table, order_param, parse_content_range, range_params, select_param, where_params,
    Params,
};
use crate::domain::ports::{
    ensure_scoped, CountQuery, Filter, GatewayError, GatewayResult, Row, SelectQuery, TableGateway,
};

const REST_PATH: &str = "rest/v1/";

/// Connection settings for a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestSettings {
    /// Project base URL, e.g. `https://project.supabase.co`.
    pub url: String,
    pub api_key: String,
    /// Sent as `Accept-Profile` / `Content-Profile` when set.
    pub schema: Option<String>,
    pub timeout: Duration,
}

pub struct PostgrestGateway {
    client: Client,
    base: Url,
    schema: Option<String>,
}

impl PostgrestGateway {
    pub fn new(settings: PostgrestSettings) -> GatewayResult<Self> {
        let mut base = Url::parse(settings.url.trim())
            .map_err(|e| GatewayError::Transport(format!("invalid backend url: {e}")))?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let base = base
            .join(REST_PATH)
            .map_err(|e| GatewayError::Transport(format!("invalid backend url: {e}")))?;

        let mut headers = HeaderMap::new();
        let invalid_key =
            |e: InvalidHeaderValue| GatewayError::Transport(format!("invalid api key: {e}"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&settings.api_key).map_err(invalid_key)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", settings.api_key)).map_err(invalid_key)?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(map_transport_error)?;

        Ok(Self {
            client,
            base,
            schema: settings.schema.filter(|s| !s.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    fn table_url(&self, table: &str) -> GatewayResult<Url> {
        if !is_valid_table(table) {
            return Err(GatewayError::Backend {
                status: 400,
                code: None,
                message: format!("invalid table name \"{table}\""),
            });
        }
        self.base
            .join(table)
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    fn request(&self, method: Method, table: &str, params: &Params) -> GatewayResult<RequestBuilder> {
        let writes = matches!(method, Method::POST | Method::PATCH | Method::DELETE);
        let mut builder = self
            .client
            .request(method, self.table_url(table)?)
            .query(params);
        if let Some(schema) = &self.schema {
            let profile = if writes { "Content-Profile" } else { "Accept-Profile" };
            builder = builder.header(profile, schema.as_str());
        }
        if writes {
            builder = builder.header("Prefer", "return=representation");
        }
        Ok(builder)
    }

    async fn send_rows(&self, table: &str, builder: RequestBuilder) -> GatewayResult<Vec<Row>> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(table, status, body.as_ref()));
        }
        if body.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| GatewayError::Decode(format!("{table}: {e}")))?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(GatewayError::Decode(format!(
                        "{table}: expected object rows, got {other}"
                    ))),
                })
                .collect(),
            Value::Object(row) => Ok(vec![row]),
            other => Err(GatewayError::Decode(format!(
                "{table}: expected a row array, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl TableGateway for PostgrestGateway {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn select(&self, query: &SelectQuery) -> GatewayResult<Vec<Row>> {
        let mut params: Params = vec![("select".to_string(), select_param(&query.projection))];
        params.extend(where_params(&query.filters, query.search.as_ref()));
        if let Some(sort) = &query.sort {
            params.push(order_param(sort));
        }
        if let Some(range) = query.range {
            params.extend(range_params(range));
        }
        debug!(table = %query.table, ?params, "postgrest select");
        let builder = self.request(Method::GET, &query.table, &params)?;
        self.send_rows(&query.table, builder).await
    }

    async fn count(&self, query: &CountQuery) -> GatewayResult<u64> {
        let mut params: Params = vec![("select".to_string(), "*".to_string())];
        params.extend(where_params(&query.filters, query.search.as_ref()));
        let response = self
            .request(Method::HEAD, &query.table, &params)?
            .header("Prefer", format!("count={}", query.mode.as_str()))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error(&query.table, status, body.as_ref()));
        }
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| GatewayError::Decode(format!("{}: missing Content-Range", query.table)))?;
        parse_content_range(range).ok_or_else(|| {
            GatewayError::Decode(format!("{}: unusable Content-Range \"{range}\"", query.table))
        })
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> GatewayResult<Vec<Row>> {
        let body: Vec<Value> = rows.into_iter().map(Value::Object).collect();
        let builder = self.request(Method::POST, table, &Vec::new())?.json(&body);
        self.send_rows(table, builder).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> GatewayResult<Vec<Row>> {
        ensure_scoped(table, filters)?;
        let params = where_params(filters, None);
        let builder = self
            .request(Method::PATCH, table, &params)?
            .json(&Value::Object(patch));
        self.send_rows(table, builder).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> GatewayResult<Vec<Row>> {
        ensure_scoped(table, filters)?;
        let params = where_params(filters, None);
        let builder = self.request(Method::DELETE, table, &params)?;
        self.send_rows(table, builder).await
    }

    async fn ping(&self) -> GatewayResult<()> {
        let response = self
            .client
            .get(self.base.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status.is_server_error() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error("", status, body.as_ref()));
        }
        Ok(())
    }
}
