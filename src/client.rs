//! HTTP client for a running proxy: upload a file, query a job's status.

use crate::config::SubmitConfig;
use crate::error::ForgeError;
use crate::output::{ErrorBody, StatusResponse, SubmissionResult, UploadEnvelope};
use crate::upload::Upload;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info};

/// Multipart field the webhook reads the document from.
pub const UPLOAD_FIELD: &str = "data";

pub const UPLOAD_PATH: &str = "/api/upload-document";
pub const STATUS_PATH: &str = "/api/check-status";

/// Talks to the proxy's upload and status endpoints.
#[derive(Debug, Clone)]
pub struct ForgeClient {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    poll_timeout: Duration,
}

impl ForgeClient {
    pub fn new(config: &SubmitConfig) -> Result<Self, ForgeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ForgeError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            upload_timeout: Duration::from_secs(config.request_timeout_secs),
            poll_timeout: Duration::from_millis(config.poll_interval_ms),
        })
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }

    pub fn status_url(&self) -> String {
        format!("{}{}", self.base_url, STATUS_PATH)
    }

    /// Upload the file as the `data` field of a multipart form.
    pub async fn submit(&self, upload: &Upload) -> Result<SubmissionResult, ForgeError> {
        let url = self.upload_url();
        info!("Submitting {} ({}) to {}", upload.file_name, upload.size_label(), url);

        let part = Part::stream_with_length(upload.bytes.clone(), upload.size() as u64)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| transport_error(&url, e, self.upload_timeout))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&url, e, self.upload_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &text, "Failed to submit"));
        }

        let envelope: UploadEnvelope = response
            .json()
            .await
            .map_err(|_| ForgeError::InvalidResponse)?;
        debug!("Upload response: {:?}", envelope);

        SubmissionResult::from_envelope(&envelope).ok_or(ForgeError::InvalidResponse)
    }

    /// Ask the proxy for the status of `job_id`.
    ///
    /// A poll may take at most one poll interval, so a hung status endpoint
    /// cannot stretch the attempt cap beyond `max_poll_attempts` intervals.
    pub async fn check_status(&self, job_id: &str) -> Result<StatusResponse, ForgeError> {
        let url = self.status_url();
        let response = self
            .http
            .get(&url)
            .query(&[("jobId", job_id)])
            .timeout(self.poll_timeout)
            .send()
            .await
            .map_err(|e| transport_error(&url, e, self.poll_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &text, "Status check failed"));
        }

        response
            .json::<StatusResponse>()
            .await
            .map_err(|_| ForgeError::InvalidResponse)
    }
}

fn transport_error(url: &str, e: reqwest::Error, after: Duration) -> ForgeError {
    if e.is_timeout() {
        ForgeError::Timeout {
            url: url.to_string(),
            after,
        }
    } else {
        ForgeError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Turn a non-success proxy response into an error, preferring its `error` text
/// and otherwise falling back to `"<fallback>: <status>"`.
fn rejection(status: u16, body: &str, fallback: &str) -> ForgeError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("{fallback}: {status}"));
    ForgeError::Rejected { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_prefers_error_field() {
        let e = rejection(
            502,
            r#"{"error":"N8N webhook failed: bad gateway"}"#,
            "Failed to submit",
        );
        assert_eq!(e.to_string(), "N8N webhook failed: bad gateway");
    }

    #[test]
    fn rejection_falls_back_to_status() {
        let e = rejection(524, "<html>A timeout occurred</html>", "Failed to submit");
        assert_eq!(e.to_string(), "Failed to submit: 524");
        assert!(e.is_timeout_like());

        let empty = rejection(500, r#"{"error":""}"#, "Failed to submit");
        assert_eq!(empty.to_string(), "Failed to submit: 500");
    }

    #[test]
    fn status_rejection_names_the_status_check() {
        let e = rejection(503, "Service Unavailable", "Status check failed");
        assert_eq!(e.to_string(), "Status check failed: 503");
        assert!(!e.to_string().contains("submit"));
    }

    #[test]
    fn poll_timeout_follows_poll_interval() {
        let config = SubmitConfig::builder()
            .poll_interval_ms(250)
            .request_timeout_secs(60)
            .build()
            .unwrap();
        let client = ForgeClient::new(&config).unwrap();
        assert_eq!(client.poll_timeout, Duration::from_millis(250));
        assert_eq!(client.upload_timeout, Duration::from_secs(60));
    }

    #[test]
    fn urls_are_joined_without_double_slash() {
        let config = SubmitConfig::builder()
            .server_url("http://localhost:3000/")
            .build()
            .unwrap();
        let client = ForgeClient::new(&config).unwrap();
        assert_eq!(client.upload_url(), "http://localhost:3000/api/upload-document");
        assert_eq!(client.status_url(), "http://localhost:3000/api/check-status");
    }
}
