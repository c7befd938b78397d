//! Configuration for the proxy server and the submit client.
//!
//! Both sides are configured through a struct plus a validating builder:
//! [`ProxyConfig`] for `contentforge serve` and [`SubmitConfig`] for
//! `contentforge submit` (or any library caller of [`crate::submit::submit`]).
//! Callers set only what they care about and rely on the defaults for the
//! rest.

use crate::error::ForgeError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::net::SocketAddr;

/// Webhook the proxy forwards uploads to unless told otherwise.
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://serbay.app.n8n.cloud/webhook/87f97854-d2b0-4c35-baf8-4ed9d48ef702";

/// Address `serve` binds to by default.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Proxy base URL `submit` talks to by default.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

// ── Proxy ────────────────────────────────────────────────────────────────

/// Configuration for the upload proxy.
///
/// # Example
/// ```rust
/// use contentforge::ProxyConfig;
///
/// let config = ProxyConfig::builder()
///     .webhook_url("https://hooks.example.com/webhook/abc")
///     .status_url("https://hooks.example.com/webhook/status")
///     .upstream_timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(config.upstream_timeout_secs, 120);
/// ```
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Socket address the HTTP server listens on. Default: `127.0.0.1:3000`.
    pub bind_addr: SocketAddr,

    /// Webhook that receives the forwarded multipart upload.
    pub webhook_url: String,

    /// Upstream endpoint answering `?jobId=<id>` status queries.
    /// If None, `/api/check-status` answers 501.
    pub status_url: Option<String>,

    /// Timeout for each upstream call in seconds. Default: 300.
    ///
    /// Document processing routinely takes one to two minutes before the
    /// webhook answers synchronously.
    pub upstream_timeout_secs: u64,

    /// Largest accepted upload body in bytes. Default: 25 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            status_url: None,
            upstream_timeout_secs: 300,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ProxyConfig {
    /// Create a new builder for `ProxyConfig`.
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ProxyConfig`].
#[derive(Debug)]
pub struct ProxyConfigBuilder {
    config: ProxyConfig,
}

impl ProxyConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.webhook_url = url.into();
        self
    }

    pub fn status_url(mut self, url: impl Into<String>) -> Self {
        self.config.status_url = Some(url.into());
        self
    }

    pub fn upstream_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upstream_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProxyConfig, ForgeError> {
        let c = &self.config;
        check_http_url("webhook URL", &c.webhook_url)?;
        if let Some(ref url) = c.status_url {
            check_http_url("status URL", url)?;
        }
        if c.upstream_timeout_secs == 0 {
            return Err(ForgeError::InvalidConfig(
                "Upstream timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(ForgeError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Submit ───────────────────────────────────────────────────────────────

/// Configuration for one submission against a running proxy.
///
/// # Example
/// ```rust
/// use contentforge::SubmitConfig;
///
/// let config = SubmitConfig::builder()
///     .server_url("http://localhost:3000")
///     .max_poll_attempts(20)
///     .build()
///     .unwrap();
/// assert_eq!(config.poll_interval_ms, 3000);
/// ```
#[derive(Clone)]
pub struct SubmitConfig {
    /// Base URL of the proxy (no trailing path). Default: `http://127.0.0.1:3000`.
    pub server_url: String,

    /// Delay between status polls in milliseconds. Default: 3000.
    ///
    /// Also the timeout of a single status poll.
    pub poll_interval_ms: u64,

    /// Non-terminal status responses tolerated before giving up. Default: 40.
    ///
    /// 40 polls at the 3 s default is two minutes.
    pub max_poll_attempts: u32,

    /// Delay between cosmetic stage-label advances in milliseconds. Default: 8000.
    pub stage_interval_ms: u64,

    /// Timeout for the upload request in seconds. Default: 300.
    pub request_timeout_secs: u64,

    /// Receives stage, poll and completion events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            poll_interval_ms: 3000,
            max_poll_attempts: 40,
            stage_interval_ms: 8000,
            request_timeout_secs: 300,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SubmitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitConfig")
            .field("server_url", &self.server_url)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("stage_interval_ms", &self.stage_interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SubmitProgressCallback>"),
            )
            .finish()
    }
}

impl SubmitConfig {
    /// Create a new builder for `SubmitConfig`.
    pub fn builder() -> SubmitConfigBuilder {
        SubmitConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SubmitConfig`].
#[derive(Debug)]
pub struct SubmitConfigBuilder {
    config: SubmitConfig,
}

impl SubmitConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.server_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.config.max_poll_attempts = n;
        self
    }

    pub fn stage_interval_ms(mut self, ms: u64) -> Self {
        self.config.stage_interval_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SubmitConfig, ForgeError> {
        let c = &self.config;
        check_http_url("server URL", &c.server_url)?;
        if c.poll_interval_ms == 0 || c.stage_interval_ms == 0 {
            return Err(ForgeError::InvalidConfig(
                "Poll and stage intervals must be ≥ 1 ms".into(),
            ));
        }
        if c.max_poll_attempts == 0 {
            return Err(ForgeError::InvalidConfig(
                "Max poll attempts must be ≥ 1".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(ForgeError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

fn check_http_url(what: &str, url: &str) -> Result<(), ForgeError> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(ForgeError::InvalidConfig(format!(
            "{what} must be http or https, got scheme '{}'",
            parsed.scheme()
        ))),
        Err(e) => Err(ForgeError::InvalidConfig(format!(
            "{what} '{url}' is not a valid URL: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_defaults() {
        let c = ProxyConfig::default();
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.webhook_url, DEFAULT_WEBHOOK_URL);
        assert!(c.status_url.is_none());
        assert_eq!(c.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn proxy_rejects_bad_urls() {
        assert!(ProxyConfig::builder().webhook_url("not a url").build().is_err());
        assert!(ProxyConfig::builder()
            .webhook_url("ftp://example.com/hook")
            .build()
            .is_err());
        assert!(ProxyConfig::builder()
            .status_url("file:///etc/passwd")
            .build()
            .is_err());
    }

    #[test]
    fn proxy_rejects_zero_limits() {
        assert!(ProxyConfig::builder().upstream_timeout_secs(0).build().is_err());
        assert!(ProxyConfig::builder().max_upload_bytes(0).build().is_err());
    }

    #[test]
    fn submit_defaults_match_two_minute_window() {
        let c = SubmitConfig::default();
        assert_eq!(c.poll_interval_ms, 3000);
        assert_eq!(c.max_poll_attempts, 40);
        assert_eq!(c.stage_interval_ms, 8000);
        assert_eq!(
            c.poll_interval_ms * u64::from(c.max_poll_attempts),
            120_000
        );
    }

    #[test]
    fn submit_server_url_trailing_slash_is_trimmed() {
        let c = SubmitConfig::builder()
            .server_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(c.server_url, "http://localhost:8080");
    }

    #[test]
    fn submit_rejects_zero_values() {
        assert!(SubmitConfig::builder().poll_interval_ms(0).build().is_err());
        assert!(SubmitConfig::builder().stage_interval_ms(0).build().is_err());
        assert!(SubmitConfig::builder().max_poll_attempts(0).build().is_err());
        assert!(SubmitConfig::builder().request_timeout_secs(0).build().is_err());
    }

    #[test]
    fn submit_debug_hides_callback() {
        let c = SubmitConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn SubmitProgressCallback>"));
    }
}
