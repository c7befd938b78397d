//! `GET /api/check-status?jobId=<id>`: forward a status query upstream.

use super::{cors_headers, preflight_response, upstream_failure, AppState};
use crate::error::ProxyError;
use crate::output::StatusResponse;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

pub const STATUS_METHODS: &str = "GET, OPTIONS";

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

/// Relay the upstream status for a job, normalized to `{ status, data? }`.
pub async fn check_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, ProxyError> {
    let job_id = query
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ProxyError::MissingParameter("jobId query parameter is required".into()))?;
    let url = state
        .config
        .status_url
        .as_deref()
        .ok_or(ProxyError::StatusNotConfigured)?;
    let timeout_secs = state.config.upstream_timeout_secs;

    debug!("Checking status of job {}", job_id);
    let response = state
        .http
        .get(url)
        .query(&[("jobId", job_id.as_str())])
        .send()
        .await
        .map_err(|e| upstream_failure(e, timeout_secs))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| upstream_failure(e, timeout_secs))?;
    if !status.is_success() {
        return Err(ProxyError::StatusUpstream { status, body: text });
    }

    let parsed: StatusResponse =
        serde_json::from_str(&text).map_err(|e| ProxyError::InvalidUpstreamBody(e.to_string()))?;
    debug!("Job {} is {:?}", job_id, parsed.status);

    Ok((StatusCode::OK, cors_headers(STATUS_METHODS), Json(parsed)).into_response())
}

/// `OPTIONS /api/check-status`.
pub async fn preflight() -> Response {
    preflight_response(STATUS_METHODS)
}
