//! HTTP server
//!
//! Builds the axum router with the guard on every route and the request-id
//! and tracing layers around it, then serves it until shutdown.

mod handlers;

pub use handlers::{HealthResponse, MessageResponse};

use crate::access_control::Role;
use crate::auth::{GuardState, JwtKeys, RoutePolicy, RouteTable, guard};
use crate::config::{AppInfoConfig, ServerConfig};
use crate::error::AppError;
use crate::telemetry::{REQUEST_ID_HEADER, RequestSpan, ShortRequestId, on_failure, on_response};
use crate::util::shutdown_signal;
use axum::extract::Request;
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::{Router, middleware};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Permission required to list tasks
pub const VIEW_TASKS_PERMISSION: &str = "GET /tasks-service/*";

/// Shared state for handlers and the guard
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<JwtKeys>,
    pub routes: Arc<RouteTable>,
    pub app: AppInfoConfig,
}

impl AppState {
    /// State using the built-in [`route_table`]
    pub fn new(db: DatabaseConnection, keys: JwtKeys, app: AppInfoConfig) -> Self {
        Self {
            db: Arc::new(db),
            keys: Arc::new(keys),
            routes: Arc::new(route_table()),
            app,
        }
    }

    fn guard_state(&self) -> GuardState {
        GuardState {
            keys: self.keys.clone(),
            routes: self.routes.clone(),
        }
    }
}

/// Access requirements of every route the router serves
pub fn route_table() -> RouteTable {
    RouteTable::new()
        .route(Method::GET, "/health", RoutePolicy::public())
        .route(Method::POST, "/auth/public-endpoint", RoutePolicy::public())
        .route(Method::POST, "/auth/protected", RoutePolicy::authenticated())
        .route(
            Method::GET,
            "/auth/admin-only",
            RoutePolicy::authenticated().with_roles([Role::Supervisor, Role::SuperRole]),
        )
        .route(
            Method::GET,
            "/auth/tasks",
            RoutePolicy::authenticated().with_permissions([VIEW_TASKS_PERMISSION]),
        )
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let span = RequestSpan::new(&state.app);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/public-endpoint", post(handlers::public_endpoint))
        .route("/auth/protected", post(handlers::protected))
        .route("/auth/admin-only", get(handlers::admin_only))
        .route("/auth/tasks", get(handlers::tasks))
        .route_layer(middleware::from_fn_with_state(state.guard_state(), guard))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), ShortRequestId))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(move |request: &Request| span.make_span(request))
                        .on_response(on_response)
                        .on_failure(on_failure),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CatchPanicLayer::new()),
        )
}

/// Serve `router` on the configured address until Ctrl+C or SIGTERM
pub async fn serve(router: Router, config: &ServerConfig) -> Result<(), AppError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
