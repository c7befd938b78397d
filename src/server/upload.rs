//! `POST /api/upload-document`: forward the multipart body to the webhook.
//!
//! The body is forwarded byte-for-byte with its original `Content-Type`
//! (boundary included), so the webhook sees exactly what the browser sent.

use super::{cors_headers, preflight_response, upstream_failure, AppState};
use crate::error::ProxyError;
use crate::output::UploadEnvelope;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

pub const UPLOAD_METHODS: &str = "POST, OPTIONS";

/// Forward an upload and relay the webhook's answer.
pub async fn upload_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !is_multipart(content_type) {
        return Err(ProxyError::BadRequest(format!(
            "Expected a multipart/form-data body, got '{content_type}'"
        )));
    }

    let timeout_secs = state.config.upstream_timeout_secs;
    info!("Forwarding {} byte upload to webhook", body.len());

    let response = state
        .http
        .post(&state.config.webhook_url)
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .send()
        .await
        .map_err(|e| upstream_failure(e, timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .map_err(|e| upstream_failure(e, timeout_secs))?;
        return Err(ProxyError::Upstream { status, body: text });
    }

    let upstream_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let text = response
        .text()
        .await
        .map_err(|e| upstream_failure(e, timeout_secs))?;
    debug!("Webhook answered {} ({:?}, {} bytes)", status, upstream_type, text.len());

    let data = interpret_webhook_body(upstream_type.as_deref(), &text)?;
    Ok((
        StatusCode::OK,
        cors_headers(UPLOAD_METHODS),
        Json(UploadEnvelope::success(data)),
    )
        .into_response())
}

/// `OPTIONS /api/upload-document`.
pub async fn preflight() -> Response {
    preflight_response(UPLOAD_METHODS)
}

fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case("multipart/form-data"))
}

/// Turn a successful webhook body into the `data` of the envelope.
///
/// Declared JSON must parse. Anything else is parsed as JSON if it can be,
/// and otherwise taken to be the result link itself.
pub fn interpret_webhook_body(content_type: Option<&str>, text: &str) -> Result<Value, ProxyError> {
    let declared_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    if declared_json {
        return serde_json::from_str(text)
            .map_err(|e| ProxyError::InvalidUpstreamBody(e.to_string()));
    }
    Ok(serde_json::from_str(text).unwrap_or_else(|_| json!({ "webViewLink": text })))
}
