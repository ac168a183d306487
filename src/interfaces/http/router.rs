//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    AnalyticsService, AnnouncementService, ColumnInfo, DashboardService, DepartmentCard,
    DepartmentService, ExplorerTable, RecordService, SessionService, SharedSessionRegistry,
};
use crate::config::{AppConfig, PortalConfig};
use crate::domain::analytics::{AnalyticsReport, DepartmentPerformance, NamedCount};
use crate::domain::dashboard::FactMetrics;
use crate::domain::navigation::MenuEntry;
use crate::domain::ports::SharedGateway;
use crate::domain::{Announcement, UserSession};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::{AnnouncementStore, EmployeeTable};
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    analytics, announcements, auth, dashboard, departments, explorer, health, metrics,
    navigation, request_id,
};

/// Everything the routes need. Axum extracts each module's own state via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub gateway: SharedGateway,
    pub sessions: Arc<SessionService>,
    pub dashboard: Arc<DashboardService>,
    pub departments: Arc<DepartmentService>,
    pub announcements: Arc<AnnouncementService>,
    pub analytics: Arc<AnalyticsService>,
    pub portal: PortalConfig,
    pub started_at: Arc<Instant>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Wire the services over one gateway and session registry.
    pub fn new(
        gateway: SharedGateway,
        registry: SharedSessionRegistry,
        config: &AppConfig,
        metrics: PrometheusHandle,
    ) -> Self {
        let records = RecordService::new(gateway.clone(), config.backend.count_mode);
        let sessions = SessionService::new(
            Arc::new(EmployeeTable::new(gateway.clone())),
            registry,
            JwtConfig::from_security(&config.security),
        );
        let announcements =
            AnnouncementService::new(Arc::new(AnnouncementStore::new(gateway.clone())));

        Self {
            sessions: Arc::new(sessions),
            dashboard: Arc::new(DashboardService::new(records.clone())),
            departments: Arc::new(DepartmentService::new(records.clone())),
            announcements: Arc::new(announcements),
            analytics: Arc::new(AnalyticsService::new(records)),
            portal: config.portal.clone(),
            started_at: Arc::new(Instant::now()),
            gateway,
            metrics,
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        AuthState {
            sessions: Arc::clone(&s.sessions),
        }
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            sessions: Arc::clone(&s.sessions),
        }
    }
}

impl FromRef<AppState> for navigation::NavigationState {
    fn from_ref(s: &AppState) -> Self {
        navigation::NavigationState {
            sessions: Arc::clone(&s.sessions),
        }
    }
}

impl FromRef<AppState> for dashboard::DashboardState {
    fn from_ref(s: &AppState) -> Self {
        dashboard::DashboardState {
            dashboard: Arc::clone(&s.dashboard),
            departments: Arc::clone(&s.departments),
            announcements: Arc::clone(&s.announcements),
        }
    }
}

impl FromRef<AppState> for departments::DepartmentState {
    fn from_ref(s: &AppState) -> Self {
        departments::DepartmentState {
            departments: Arc::clone(&s.departments),
            portal: s.portal.clone(),
        }
    }
}

impl FromRef<AppState> for announcements::AnnouncementState {
    fn from_ref(s: &AppState) -> Self {
        announcements::AnnouncementState {
            announcements: Arc::clone(&s.announcements),
        }
    }
}

impl FromRef<AppState> for analytics::AnalyticsState {
    fn from_ref(s: &AppState) -> Self {
        analytics::AnalyticsState {
            analytics: Arc::clone(&s.analytics),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            gateway: s.gateway.clone(),
            session_registry: s.sessions.registry().clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<AppState> for metrics::MetricsState {
    fn from_ref(s: &AppState) -> Self {
        metrics::MetricsState {
            handle: s.metrics.clone(),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::logout,
        auth::get_current_user,
        // Navigation
        navigation::get_menu,
        navigation::navigate,
        // Dashboard
        dashboard::get_dashboard,
        // Departments
        departments::list_departments,
        departments::list_department_records,
        // Announcements
        announcements::list_announcements,
        announcements::create_announcement,
        announcements::update_announcement,
        announcements::delete_announcement,
        // Analytics
        analytics::get_analytics,
        // Data Explorer
        explorer::list_tables,
        explorer::explore_table,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            UserSession,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionInfo,
            // Navigation
            MenuEntry,
            navigation::NavigateRequest,
            navigation::NavigationResponse,
            // Dashboard
            dashboard::DashboardResponse,
            FactMetrics,
            // Departments
            DepartmentCard,
            ColumnInfo,
            departments::RecordPageDto,
            ExplorerTable,
            // Announcements
            Announcement,
            announcements::AnnouncementBody,
            announcements::UpdateAnnouncementRequest,
            // Analytics
            AnalyticsReport,
            NamedCount,
            DepartmentPerformance,
            // Health
            health::HealthResponse,
            health::BackendHealth,
            health::HealthStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server and backend health"),
        (name = "Authentication", description = "Email sign-in, sign-out and the current session"),
        (name = "Navigation", description = "Sidebar menu and guarded page transitions"),
        (name = "Dashboard", description = "Headline metrics, department tiles and announcements"),
        (name = "Departments", description = "Per-department record browsing"),
        (name = "Announcements", description = "Portal notices; executives manage them"),
        (name = "Analytics", description = "Month-to-date operational report (executives)"),
        (name = "Data Explorer", description = "Browse any department table (executives)"),
    ),
    info(
        title = "Hospital Staff Portal API",
        version = "1.0.0",
        description = "Role-gated access to hospital records held in a hosted PostgREST backend",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(state.clone());

    // Everything else under /api/v1 needs a session
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route(
            "/navigation",
            get(navigation::get_menu).post(navigation::navigate),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/departments", get(departments::list_departments))
        .route(
            "/departments/{slug}/records",
            get(departments::list_department_records),
        )
        .route(
            "/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(announcements::update_announcement).delete(announcements::delete_announcement),
        )
        .route("/analytics", get(analytics::get_analytics))
        .route("/explorer/tables", get(explorer::list_tables))
        .route("/explorer/tables/{table}", get(explorer::explore_table))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    // Operational endpoints (public)
    let ops_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(state);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(ops_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1", protected_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::SessionRegistry;
    use crate::domain::ports::{Row, TableGateway};
    use crate::infrastructure::InMemoryGateway;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn app() -> Router {
        let gateway = InMemoryGateway::with_portal_schema();
        gateway
            .insert(
                "employees",
                vec![
                    row(json!({
                        "full_name": "Grace Hopper",
                        "email": "grace@cloudink.hospital",
                        "department_name": "Administration",
                        "job_title": "Chief Executive Officer",
                        "salary": 250000
                    })),
                    row(json!({
                        "full_name": "Paul Pill",
                        "email": "paul@cloudink.hospital",
                        "department_name": "Pharmacy and Inventory",
                        "job_title": "Pharmacist",
                        "salary": 90000
                    })),
                ],
            )
            .await
            .unwrap();
        gateway
            .insert(
                "medications",
                vec![row(json!({"generic_name": "Amoxicillin", "quantity_stock": 40}))],
            )
            .await
            .unwrap();

        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = AppState::new(
            Arc::new(gateway),
            SessionRegistry::shared(),
            &AppConfig::default(),
            handle,
        );
        create_api_router(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": email})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"]["reachable"], true);
        assert_eq!(body["backend"]["kind"], "memory");
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_session() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access Denied: You must be signed in.");
    }

    #[tokio::test]
    async fn test_unknown_email_is_rejected() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "nobody@cloudink.hospital"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"],
            "User not found. Please ensure you are using a valid employee email."
        );
    }

    #[tokio::test]
    async fn test_dashboard_and_me_for_department_user() {
        let app = app().await;
        let token = login(&app, "PAUL@cloudink.hospital").await;

        let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_executive"], false);
        assert_eq!(body["data"]["menu"].as_array().unwrap().len(), 6);

        let (status, body) =
            send(&app, Method::GET, "/api/v1/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metrics"]["total_employees"], 2);
        let open: Vec<&str> = body["data"]["departments"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|d| d["authorized"] == true)
            .map(|d| d["slug"].as_str().unwrap())
            .collect();
        assert_eq!(open, vec!["pharmacy"]);
    }

    #[tokio::test]
    async fn test_department_records_are_gated() {
        let app = app().await;
        let token = login(&app, "paul@cloudink.hospital").await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/departments/pharmacy/records?page=1&page_size=5",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["table"], "medications");
        assert_eq!(body["data"]["total"], 1);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/departments/human-resources/records",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/departments/cafeteria/records",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_executive_tools() {
        let app = app().await;
        let exec = login(&app, "grace@cloudink.hospital").await;
        let staff = login(&app, "paul@cloudink.hospital").await;

        let (status, body) =
            send(&app, Method::GET, "/api/v1/analytics", Some(&staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["error"],
            "Access Denied: Only Executive staff can access Analytics."
        );

        let (status, _) = send(&app, Method::GET, "/api/v1/analytics", Some(&exec), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/explorer/tables/employees?sort=full_name&direction=desc",
            Some(&exec),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["items"][0]["full_name"], "Paul Pill");
    }

    #[tokio::test]
    async fn test_announcement_lifecycle() {
        let app = app().await;
        let exec = login(&app, "grace@cloudink.hospital").await;
        let staff = login(&app, "paul@cloudink.hospital").await;
        let notice = json!({"title": "Fire drill", "content": "Friday at noon."});

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/announcements",
            Some(&staff),
            Some(notice.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/announcements",
            Some(&exec),
            Some(notice.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_i64().unwrap();

        let stale = json!({
            "title": "Fire drill",
            "content": "Moved to Monday.",
            "expected": {"title": "Fire drill", "content": "Thursday."}
        });
        let uri = format!("/api/v1/announcements/{}", id);
        let (status, _) = send(&app, Method::PUT, &uri, Some(&exec), Some(stale)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let fresh = json!({
            "title": "Fire drill",
            "content": "Moved to Monday.",
            "expected": notice
        });
        let (status, body) = send(&app, Method::PUT, &uri, Some(&exec), Some(fresh)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "Moved to Monday.");

        let (_, body) =
            send(&app, Method::GET, "/api/v1/announcements", Some(&staff), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&exec), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&exec), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_navigation_guards_and_logout() {
        let app = app().await;
        let token = login(&app, "paul@cloudink.hospital").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/navigation",
            Some(&token),
            Some(json!({"page": "pharmacy"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["label"], "Pharmacy and Inventory");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/navigation",
            Some(&token),
            Some(json!({"page": "data-explorer"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(&app, Method::POST, "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Session has ended");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/auth/login"].is_object());
        assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
