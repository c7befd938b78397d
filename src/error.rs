//! Error types for the contentforge library.
//!
//! Two distinct error types reflect the two sides of the proxy:
//!
//! * [`ForgeError`]: **Client side.** One submission cannot proceed
//!   (bad file, proxy rejected the upload, processing failed or timed out).
//!   Returned as `Err(ForgeError)` from [`crate::submit::submit`] and the
//!   [`crate::client::ForgeClient`] calls, and mirrored into the
//!   human-readable error text of [`crate::session::UploadSession`].
//!
//! * [`ProxyError`]: **Server side.** A proxied request failed. Rendered by
//!   the HTTP layer as a `{ "error": "..." }` JSON envelope carrying the
//!   relayed status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::output::ErrorBody;

/// All errors a submission can end with.
#[derive(Debug, Error)]
pub enum ForgeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The selected file does not declare `application/pdf`.
    #[error("'{file_name}' is not a PDF (declared type: {content_type})")]
    NotAPdf {
        file_name: String,
        content_type: String,
    },

    /// Submit was requested before any file was selected.
    #[error("Please select a file first")]
    NoFileSelected,

    // ── Proxy errors ──────────────────────────────────────────────────────
    /// The proxy answered with a non-success status.
    ///
    /// `message` is the proxy's `error` field, or `Failed to submit: <status>`
    /// when the body carried none.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request to the proxy did not complete.
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The request to the proxy exceeded its timeout.
    #[error("Request timeout after {after:?} for '{url}'")]
    Timeout { url: String, after: Duration },

    /// A success response carried neither a result link nor a job id.
    #[error("Invalid response from server")]
    InvalidResponse,

    // ── Processing errors ─────────────────────────────────────────────────
    /// The status endpoint reported `failed`.
    #[error("Processing failed. Please try again.")]
    ProcessingFailed,

    /// The poll loop hit its attempt cap without a terminal status.
    #[error("Processing timeout. Please contact support.")]
    PollTimeout { attempts: u32 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Server errors ─────────────────────────────────────────────────────
    /// The proxy could not bind or serve on its address.
    #[error("Server error on {addr}: {source}")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForgeError {
    /// Whether the failure looks like a gateway or request timeout.
    ///
    /// Long-running webhook calls often surface as a Cloudflare `524` or a
    /// client-side timeout while the work continues upstream, so these are
    /// treated as "still processing" rather than as hard failures.
    pub fn is_timeout_like(&self) -> bool {
        if let ForgeError::Rejected { status: 524, .. } | ForgeError::Timeout { .. } = self {
            return true;
        }
        let msg = self.to_string();
        msg.contains("524") || msg.contains("timeout")
    }
}

/// A proxied request that failed, rendered as an error envelope.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The webhook answered with a non-success status; relayed verbatim.
    #[error("N8N webhook failed: {body}")]
    Upstream { status: StatusCode, body: String },

    /// The status endpoint answered with a non-success status.
    #[error("Status check failed: {body}")]
    StatusUpstream { status: StatusCode, body: String },

    /// The upstream call did not answer within the configured timeout.
    #[error("Upstream timeout after {secs}s")]
    UpstreamTimeout { secs: u64 },

    /// The incoming request is not something we can forward.
    #[error("{0}")]
    BadRequest(String),

    /// The incoming request is missing a required parameter.
    #[error("{0}")]
    MissingParameter(String),

    /// The status endpoint is not configured on this proxy.
    #[error("Status endpoint is not configured")]
    StatusNotConfigured,

    /// The upstream declared JSON (or had to be JSON) but sent something else.
    #[error("Invalid response body from upstream: {0}")]
    InvalidUpstreamBody(String),

    /// Connection or body-read failure talking to the upstream.
    #[error("{0}")]
    Transport(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } | ProxyError::StatusUpstream { status, .. } => {
                *status
            }
            ProxyError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ProxyError::StatusNotConfigured => StatusCode::NOT_IMPLEMENTED,
            ProxyError::BadRequest(_)
            | ProxyError::InvalidUpstreamBody(_)
            | ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Transport(e.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), error = %self, "Proxy request failed");
        let body = ErrorBody {
            error: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_display_matches_envelope_text() {
        let e = ProxyError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            body: "bad gateway".into(),
        };
        assert_eq!(e.to_string(), "N8N webhook failed: bad gateway");
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn nonstandard_upstream_status_is_kept() {
        let status = StatusCode::from_u16(524).unwrap();
        let e = ProxyError::Upstream {
            status,
            body: "A timeout occurred".into(),
        };
        assert_eq!(e.status_code().as_u16(), 524);
    }

    #[test]
    fn proxy_error_status_codes() {
        assert_eq!(
            ProxyError::UpstreamTimeout { secs: 5 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::MissingParameter("jobId is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::StatusNotConfigured.status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            ProxyError::Transport("connection refused".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_timeout_mentions_timeout() {
        let e = ProxyError::UpstreamTimeout { secs: 300 };
        assert!(e.to_string().to_lowercase().contains("timeout"));
    }

    #[test]
    fn timeout_like_detection() {
        let gateway = ForgeError::Rejected {
            status: 524,
            message: "N8N webhook failed: <html>".into(),
        };
        assert!(gateway.is_timeout_like());

        let by_text = ForgeError::Rejected {
            status: 504,
            message: "Upstream timeout after 300s".into(),
        };
        assert!(by_text.is_timeout_like());

        let client = ForgeError::Timeout {
            url: "http://localhost:3000".into(),
            after: Duration::from_secs(10),
        };
        assert!(client.is_timeout_like());
        assert_eq!(
            client.to_string(),
            "Request timeout after 10s for 'http://localhost:3000'"
        );

        let hard = ForgeError::Rejected {
            status: 502,
            message: "N8N webhook failed: bad gateway".into(),
        };
        assert!(!hard.is_timeout_like());
    }

    #[test]
    fn poll_errors_display_user_text() {
        assert_eq!(
            ForgeError::ProcessingFailed.to_string(),
            "Processing failed. Please try again."
        );
        assert_eq!(
            ForgeError::PollTimeout { attempts: 40 }.to_string(),
            "Processing timeout. Please contact support."
        );
    }
}
