//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all dashboard API handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, metrics)
//! - Bind the server to a listener and drain on shutdown

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::chain::client::VaultChainClient;
use crate::config::{DashboardConfig, ServerConfig};
use crate::http::handlers;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::performance::PerformanceHistory;
use crate::session::WalletSession;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Largest accepted request body. Only the session connect call has one.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<VaultChainClient>,
    pub session: Arc<WalletSession>,
    pub history: Arc<PerformanceHistory>,
    pub config: Arc<DashboardConfig>,
}

/// HTTP server for the dashboard API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = build_router(state);
        Self { router }
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let server_config = state.config.server.clone();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/vault/config", get(handlers::vault_config))
        .route("/api/vault/state", get(handlers::vault_state))
        .route("/api/vault/initialized", get(handlers::vault_initialized))
        .route("/api/vault/shares/{address}", get(handlers::user_shares))
        .route("/api/vault/performance", get(handlers::performance))
        .route("/api/accounts/{address}/balance", get(handlers::account_balance))
        .route("/api/session", get(handlers::session_state))
        .route("/api/session/connect", post(handlers::connect))
        .route("/api/session/disconnect", post(handlers::disconnect))
        .route("/api/session/position", get(handlers::position))
        .with_state(state)
        .layer(middleware::from_fn(track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    server_config.request_timeout_secs,
                )))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(cors_layer(&server_config)),
        )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let request_id = HeaderName::from_static(X_REQUEST_ID);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id]);

    if config.cors_allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Count requests per matched route and status.
async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_api_request(&route, response.status().as_u16());
    response
}
