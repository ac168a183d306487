//! PostgREST error bodies and their mapping onto [`GatewayError`].

use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::ports::GatewayError;

/// Postgres "undefined_table" and PostgREST "table not in schema cache".
const RELATION_MISSING_CODES: [&str; 2] = ["42P01", "PGRST205"];

#[derive(Debug, Default, Deserialize)]
pub struct PostgrestErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

pub fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Transport(format!("request timed out: {error}"))
    } else {
        GatewayError::Transport(error.to_string())
    }
}

pub fn map_status_error(table: &str, status: StatusCode, body: &[u8]) -> GatewayError {
    let parsed: Option<PostgrestErrorBody> = serde_json::from_slice(body).ok();

    // HEAD responses carry no body; a bare 404 there is the missing table.
    let missing = match &parsed {
        Some(err) => err
            .code
            .as_deref()
            .is_some_and(|code| RELATION_MISSING_CODES.contains(&code)),
        None => status == StatusCode::NOT_FOUND && body.is_empty(),
    };
    if missing {
        return GatewayError::RelationMissing {
            table: table.to_string(),
        };
    }

    let parsed = parsed.unwrap_or_default();
    let message = match (parsed.message, parsed.hint) {
        (Some(message), Some(hint)) => format!("{message} ({hint})"),
        (Some(message), None) => message,
        (None, _) if !body.is_empty() => String::from_utf8_lossy(body).trim().to_string(),
        (None, _) => format!("status {}", status.as_u16()),
    };
    if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
        tracing::debug!(table, details = %details, "backend error details");
    }

    GatewayError::Backend {
        status: status.as_u16(),
        code: parsed.code,
        message,
    }
}
