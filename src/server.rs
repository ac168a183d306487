//! Reusable portal server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, backend
//! gateway, optional demo seeding, the session sweeper, the REST API and
//! graceful shutdown. The CLI binary and integration tests both start the
//! portal through it.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::Utc;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{error, info};

use crate::application::{SessionRegistry, SharedSessionRegistry};
use crate::config::{AppConfig, BackendKind, ConfigError, SeedConfig};
use crate::domain::ports::{GatewayError, SharedGateway};
use crate::infrastructure::{build_gateway, DemoSeeder, SeedReport};
use crate::interfaces::{create_api_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("backend error: {0}")]
    Backend(#[from] GatewayError),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the portal.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Fill an in-memory backend with demo data. Defaults to
    /// `backend.seed_on_start`; ignored for hosted backends.
    pub seed_memory_backend: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            seed_memory_backend: config.backend.seed_on_start,
            config,
        }
    }
}

impl From<AppConfig> for ServerOptions {
    fn from(config: AppConfig) -> Self {
        Self {
            seed_memory_backend: config.backend.seed_on_start,
            config,
        }
    }
}

// ── Metrics ────────────────────────────────────────────────────────

/// The process-wide Prometheus recorder. It can only be installed once, so
/// a stop and restart within one process reuses it.
fn prometheus_handle() -> Result<PrometheusHandle, ServerError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("📊 Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running portal.
///
/// # Examples
///
/// ```rust,no_run
/// use staff_portal::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to (the real port when 0 was asked for).
    pub local_addr: SocketAddr,
    pub gateway: SharedGateway,
    pub session_registry: SharedSessionRegistry,
    /// Present when the in-memory backend was seeded on start.
    pub seed_report: Option<SeedReport>,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the portal.
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Build the configured backend gateway
    /// 3. Seed it when it is in-memory and seeding is on
    /// 4. Start the session sweeper
    /// 5. Serve the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;
        config.validate()?;

        info!("Starting staff portal...");

        let prometheus_handle = prometheus_handle()?;

        // ── Backend ────────────────────────────────────────────
        let gateway = build_gateway(&config.backend)?;
        let seed_report = if opts.seed_memory_backend && config.backend.kind == BackendKind::Memory
        {
            let report = seed_demo_data(&gateway, config.seed.clone()).await?;
            info!(?report, "Seeded in-memory backend with demo data");
            Some(report)
        } else {
            None
        };

        // ── Sessions ───────────────────────────────────────────
        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let session_registry = SessionRegistry::shared();
        session_registry.start_sweeper(
            Duration::from_secs(config.security.sweep_interval_secs),
            shutdown_signal.clone(),
        );
        info!(
            "Sessions expire after {}h",
            config.security.session_ttl_hours
        );

        // ── REST API server ────────────────────────────────────
        let state = AppState::new(
            gateway.clone(),
            session_registry.clone(),
            &config,
            prometheus_handle,
        );
        let api_router = create_api_router(state);

        let api_addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: api_addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: api_addr,
            source,
        })?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Staff portal started.");

        Ok(Self {
            config,
            local_addr,
            gateway,
            session_registry,
            seed_report,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered,
    /// bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");
        let api_task = self.api_task;
        let completed = self
            .shutdown
            .run_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if completed {
            info!("👋 Staff portal shutdown complete");
        }
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down staff portal...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Fill `gateway` with a demo data set sized by `counts`.
pub async fn seed_demo_data(
    gateway: &SharedGateway,
    counts: SeedConfig,
) -> Result<SeedReport, GatewayError> {
    DemoSeeder::new(gateway.as_ref(), counts, StdRng::from_entropy(), Utc::now())
        .run()
        .await
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
