//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for both proxy endpoints
//! - Gate methods per route (POST handled, OPTIONS preflight, rest 405)
//! - Wire up middleware (request ID, tracing, body limit, CORS, metrics)
//! - Serve until the shutdown signal fires

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post, MethodRouter},
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};

use crate::config::ProxyConfig;
use crate::http::cors::{self, CorsPolicy, AUTH_ALLOW_HEADERS, DATA_ALLOW_HEADERS};
use crate::http::request::make_span;
use crate::observability::metrics;
use crate::proxy::{report, token, AppState, GoogleClient, ProxyError, UpstreamError};

/// Paths served by the token exchange handler.
pub const AUTH_PATHS: [&str; 2] = ["/ga4-auth", "/.netlify/functions/ga4-auth"];
/// Paths served by the report handler.
pub const DATA_PATHS: [&str; 2] = ["/ga4-data", "/.netlify/functions/ga4-data"];

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS header value: {0}")]
    Cors(#[from] axum::http::header::InvalidHeaderValue),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let google = GoogleClient::new(config.google.clone())?;
        let state = AppState::new(google);

        let auth_cors = CorsPolicy::new(&config.cors.allow_origin, AUTH_ALLOW_HEADERS)?;
        let data_cors = CorsPolicy::new(&config.cors.allow_origin, DATA_ALLOW_HEADERS)?;

        let router = Self::build_router(&config, state, auth_cors, data_cors);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ProxyConfig,
        state: AppState,
        auth_cors: CorsPolicy,
        data_cors: CorsPolicy,
    ) -> Router {
        let auth = endpoint(token::exchange_token, &auth_cors, "ga4-auth");
        let data = endpoint(report::run_report, &data_cors, "ga4-data");

        let mut router = Router::new();
        for path in AUTH_PATHS {
            router = router.route(path, auth.clone());
        }
        for path in DATA_PATHS {
            router = router.route(path, data.clone());
        }

        router
            .route("/health", get(health))
            .fallback(
                any(fallback).layer(middleware::from_fn_with_state(data_cors, cors::apply_cors)),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(make_span)
                            .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
                    )
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// One proxy endpoint: POST goes to `handler`, OPTIONS is a preflight,
/// everything else is 405. CORS and metrics wrap all three.
fn endpoint<H, T>(handler: H, policy: &CorsPolicy, name: &'static str) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    post(handler)
        .options(preflight)
        .fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(policy.clone(), cors::apply_cors))
        .layer(middleware::from_fn_with_state(name, metrics::track_request))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        ProxyError::NotFound.into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
