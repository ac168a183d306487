//! Table gateway adapters
//!
//! - `postgrest`: hosted PostgREST endpoint over HTTPS
//! - `memory`: process-local tables for development and tests
//! - `instrumented`: metrics decorator wrapped around either
//! - `seed`: demo data generator

pub mod instrumented;
pub mod memory;
pub mod postgrest;
pub mod seed;

use std::sync::Arc;

use tracing::info;

use crate::config::{BackendConfig, BackendKind};
use crate::domain::ports::{GatewayResult, SharedGateway};

pub use instrumented::InstrumentedGateway;
pub use memory::InMemoryGateway;
pub use postgrest::{PostgrestGateway, PostgrestSettings};
pub use seed::{DemoSeeder, SeedReport};

/// Build the configured adapter, wrapped in [`InstrumentedGateway`].
pub fn build_gateway(config: &BackendConfig) -> GatewayResult<SharedGateway> {
    let inner: SharedGateway = match config.kind {
        BackendKind::Postgrest => {
            let schema = Some(config.schema.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let gateway = PostgrestGateway::new(PostgrestSettings {
                url: config.url.clone(),
                api_key: config.api_key.clone(),
                schema,
                timeout: config.timeout(),
            })?;
            info!(url = %config.url, "Using PostgREST backend");
            Arc::new(gateway)
        }
        BackendKind::Memory => {
            info!("Using in-memory backend");
            Arc::new(InMemoryGateway::with_portal_schema())
        }
    };
    Ok(Arc::new(InstrumentedGateway::new(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds_memory_gateway() {
        let gateway = build_gateway(&BackendConfig::default()).unwrap();
        assert_eq!(gateway.name(), "memory");
    }

    #[test]
    fn test_postgrest_gateway_rejects_bad_url() {
        let config = BackendConfig {
            kind: BackendKind::Postgrest,
            url: "not a url".into(),
            api_key: "anon".into(),
            ..BackendConfig::default()
        };
        assert!(build_gateway(&config).is_err());
    }
}
