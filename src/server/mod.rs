//! The HTTP proxy: upload page, upload forwarding and status forwarding.
//!
//! ```text
//! GET     /                     embedded upload page
//! GET     /api/health           liveness
//! POST    /api/upload-document  multipart body ──▶ webhook
//! OPTIONS /api/upload-document  CORS preflight (204)
//! GET     /api/check-status     ?jobId=<id>     ──▶ status endpoint
//! OPTIONS /api/check-status     CORS preflight (204)
//! ```
//!
//! Handlers are stateless: the only shared state is the immutable
//! [`ProxyConfig`] and one pooled `reqwest::Client`.

pub mod page;
pub mod status;
pub mod upload;

use crate::client::{STATUS_PATH, UPLOAD_PATH};
use crate::config::ProxyConfig;
use crate::error::{ForgeError, ProxyError};
use axum::extract::DefaultBodyLimit;
use axum::http::header::{
    HeaderName, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Browsers may cache a preflight answer for a day.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, ForgeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ForgeError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

/// Build the router with all routes and layers.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(page::index))
        .route("/api/health", get(|| async { "OK" }))
        .route(
            UPLOAD_PATH,
            axum::routing::post(upload::upload_document).options(upload::preflight),
        )
        .route(
            STATUS_PATH,
            get(status::check_status).options(status::preflight),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `config.bind_addr` and serve until Ctrl-C.
pub async fn serve(config: ProxyConfig) -> Result<(), ForgeError> {
    let addr = config.bind_addr;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ForgeError::Server {
            addr: addr.to_string(),
            source,
        })?;
    serve_on(listener, config).await
}

/// Serve on an already-bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, config: ProxyConfig) -> Result<(), ForgeError> {
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    info!("Forwarding uploads to {}", config.webhook_url);
    match config.status_url {
        Some(ref url) => info!("Forwarding status checks to {}", url),
        None => info!("No status endpoint configured; /api/check-status answers 501"),
    }

    let app = router(AppState::new(config)?);
    info!("contentforge listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ForgeError::Server { addr, source })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    } else {
        // No signal handler available: run until the process is killed.
        std::future::pending::<()>().await;
    }
}

// ── CORS ─────────────────────────────────────────────────────────────────

/// Permissive CORS headers attached to successful proxy responses.
pub fn cors_headers(methods: &'static str) -> [(HeaderName, &'static str); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (ACCESS_CONTROL_ALLOW_METHODS, methods),
        (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}

/// `204 No Content` preflight answer with the CORS headers and a one-day max-age.
pub fn preflight_response(methods: &'static str) -> Response {
    (
        StatusCode::NO_CONTENT,
        cors_headers(methods),
        [(ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE)],
        (),
    )
        .into_response()
}

/// Map a reqwest failure talking to an upstream into a proxy error.
pub(crate) fn upstream_failure(e: reqwest::Error, timeout_secs: u64) -> ProxyError {
    if e.is_timeout() {
        ProxyError::UpstreamTimeout { secs: timeout_secs }
    } else {
        ProxyError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_has_no_content_and_max_age() {
        let resp = preflight_response(upload::UPLOAD_METHODS);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let h = resp.headers();
        assert_eq!(h[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(h[ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[test]
    fn cors_headers_carry_methods() {
        let headers = cors_headers(status::STATUS_METHODS);
        assert_eq!(headers[1].1, "GET, OPTIONS");
    }
}
