//! REST API for driving the workload
//!
//! A thin serving layer over [`crate::workload::Workload`]. Every handler
//! maps one request onto one workload operation and renders the result as
//! JSON.
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - **Basic auth** on everything but the index and health check; the
//!   credentials double as database credentials for added targets
//!
//! ## Endpoints
//!
//! - `GET /` - Command overview
//! - `GET /health` - Health check
//! - `GET /targets` - List targets
//! - `POST /targets/{id}` - Add a target
//! - `GET /targets/{id}` - Show a target
//! - `DELETE /targets/{id}` - Remove a target
//! - `POST /start`, `POST /stop` - Run lifecycle
//! - `GET /wait/{n}` - Block until some series holds `n` samples
//! - `GET /stats` - Sample counts
//! - `GET /stats/table` - Dense comparison table
//! - `GET /stats/{id}[/{operation}]` - Raw series (read by default)

#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod middleware;
#[cfg(feature = "api")]
pub mod routes;
#[cfg(feature = "api")]
pub mod state;
#[cfg(feature = "api")]
pub mod types;

#[cfg(feature = "api")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "api")]
pub use state::ApiState;

#[cfg(feature = "api")]
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
#[cfg(feature = "api")]
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8099")
    pub bind_addr: SocketAddr,

    /// Enable permissive CORS
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], crate::util::DEFAULT_LISTEN_PORT)),
            enable_cors: true,
        }
    }
}

/// Build the router with all routes
#[cfg(feature = "api")]
pub fn router(state: ApiState) -> Router {
    use tower_http::trace::TraceLayer;

    let protected = Router::new()
        .route("/targets", get(routes::targets::list_targets))
        .route(
            "/targets/:id",
            get(routes::targets::show_target)
                .post(routes::targets::add_target)
                .delete(routes::targets::remove_target),
        )
        .route("/start", post(routes::lifecycle::start))
        .route("/stop", post(routes::lifecycle::stop))
        .route("/wait/:threshold", get(routes::lifecycle::wait))
        .route("/stats", get(routes::stats::get_counts))
        .route("/stats/table", get(routes::stats::get_table))
        .route("/stats/:id", get(routes::stats::get_read_series))
        .route("/stats/:id/:operation", get(routes::stats::get_series))
        .route_layer(axum::middleware::from_fn(middleware::auth::basic_auth));

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health::health_check))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener and serve the router on a background task
///
/// Returns the bound address, which differs from the configured one when
/// binding to port 0.
#[cfg(feature = "api")]
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    use tower::ServiceBuilder;
    use tower_http::cors::{Any, CorsLayer};

    info!("binding API server to {}", config.bind_addr);

    let mut app = router(state);

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(ServiceBuilder::new().layer(cors));
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
