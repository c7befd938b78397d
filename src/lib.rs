//! # contentforge
//!
//! Upload a PDF content brief to an automation webhook and get back a link
//! to the generated article.
//!
//! The document work itself (analysis, competitor research, SEO writing)
//! happens in an external webhook. This crate is the plumbing around it:
//!
//! ```text
//! browser / CLI
//!  │
//!  ├─ 1. Session   pick a PDF, validate its declared type
//!  ├─ 2. Upload    POST multipart ──▶ proxy ──▶ webhook
//!  ├─ 3a. Link     webhook answered synchronously ──▶ done
//!  └─ 3b. Job id   poll /api/check-status every 3 s until completed/failed
//! ```
//!
//! ## Serving the proxy
//!
//! ```rust,no_run
//! use contentforge::{serve, ProxyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProxyConfig::builder()
//!         .webhook_url("https://hooks.example.com/webhook/abc")
//!         .build()?;
//!     serve(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Submitting a file
//!
//! ```rust,no_run
//! use contentforge::{submit_file, SubmitConfig, SubmitOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SubmitConfig::builder()
//!         .server_url("http://127.0.0.1:3000")
//!         .build()?;
//!     match submit_file("brief.pdf", &config).await? {
//!         SubmitOutcome::Completed { link, .. } => println!("{link}"),
//!         SubmitOutcome::StillProcessing { message, .. } => eprintln!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `contentforge` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod server;
pub mod session;
pub mod submit;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::ForgeClient;
pub use config::{ProxyConfig, ProxyConfigBuilder, SubmitConfig, SubmitConfigBuilder};
pub use error::{ForgeError, ProxyError};
pub use output::{PollStatus, ResultData, StatusResponse, SubmissionResult, UploadEnvelope};
pub use progress::{NoopProgressCallback, ProgressCallback, SubmitProgressCallback};
pub use server::{router, serve, serve_on, AppState};
pub use session::{Phase, PollStep, UploadSession, STAGES};
pub use submit::{run_session, submit, submit_file, SubmitOutcome};
pub use upload::Upload;
