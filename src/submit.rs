//! Submission entry points: upload a file and wait for the result link.
//!
//! Drives an [`UploadSession`] with two timers, the same way the upload
//! page does:
//!
//! 1. While the upload request is in flight, a stage ticker advances the
//!    cosmetic progress label every `stage_interval_ms`.
//! 2. If the proxy answers with a job id, a poll interval queries
//!    `/api/check-status` every `poll_interval_ms` until a terminal status
//!    or the attempt cap.
//!
//! Each timer is owned by the loop that uses it and is dropped as soon as
//! that loop reaches a terminal transition.

use crate::client::ForgeClient;
use crate::config::SubmitConfig;
use crate::error::ForgeError;
use crate::progress::{NoopProgressCallback, SubmitProgressCallback};
use crate::session::{Phase, PollStep, UploadSession};
use crate::upload::Upload;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tracing::{info, warn};

/// How a submission ended without an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The document is ready at `link`.
    Completed { file_name: String, link: String },
    /// The gateway gave up waiting but the webhook is still working.
    StillProcessing { file_name: String, message: String },
}

/// Read `path`, validate it as a PDF and submit it.
pub async fn submit_file(
    path: impl AsRef<Path>,
    config: &SubmitConfig,
) -> Result<SubmitOutcome, ForgeError> {
    let upload = match Upload::from_path(path).await {
        Ok(upload) => upload,
        Err(e) => {
            report_error(config, &e.to_string());
            return Err(e);
        }
    };
    submit(upload, config).await
}

/// Submit an in-memory upload and wait for the result.
///
/// # Errors
/// - [`ForgeError::NotAPdf`] when the upload does not declare `application/pdf`
/// - [`ForgeError::Rejected`] / [`ForgeError::Transport`] when the upload fails
/// - [`ForgeError::ProcessingFailed`] when the status endpoint reports `failed`
/// - [`ForgeError::PollTimeout`] when the attempt cap is reached
pub async fn submit(upload: Upload, config: &SubmitConfig) -> Result<SubmitOutcome, ForgeError> {
    let mut session = UploadSession::new(config.max_poll_attempts);
    if let Err(e) = session.select_file(upload) {
        report_error(config, session.error().unwrap_or_default());
        return Err(e);
    }
    run_session(&mut session, config).await
}

/// Tell the progress callback about a failure raised before the session runs.
fn report_error(config: &SubmitConfig, message: &str) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_error(message);
    }
}

/// Run a session that already has a file selected through to a terminal state.
///
/// The session is left in its final phase so callers can render it.
pub async fn run_session(
    session: &mut UploadSession,
    config: &SubmitConfig,
) -> Result<SubmitOutcome, ForgeError> {
    let noop = NoopProgressCallback;
    let cb: &dyn SubmitProgressCallback = match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &noop,
    };

    let client = ForgeClient::new(config)?;
    let upload = session.begin_submit()?;
    let file_name = upload.file_name.clone();

    cb.on_submit_start(&upload.file_name, upload.size());
    if let Some(stage) = session.stage() {
        cb.on_stage(stage);
    }

    // ── Upload with stage ticker ─────────────────────────────────────────
    let result = {
        let stage_every = Duration::from_millis(config.stage_interval_ms);
        let mut ticker = interval_at(Instant::now() + stage_every, stage_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let request = client.submit(&upload);
        tokio::pin!(request);

        loop {
            tokio::select! {
                res = &mut request => break res,
                _ = ticker.tick() => {
                    if let Some(stage) = session.advance_stage() {
                        cb.on_stage(stage);
                    }
                }
            }
        }
    };

    match result {
        Ok(submission) => session.on_submitted(submission),
        Err(e) => {
            if session.on_submit_failed(&e) {
                warn!("Upload of {} timed out upstream: {}", file_name, e);
                let message = session.error().unwrap_or_default().to_string();
                if let Some(stage) = session.stage() {
                    cb.on_stage(stage);
                }
                cb.on_still_processing(&message);
                return Ok(SubmitOutcome::StillProcessing { file_name, message });
            }
            cb.on_error(session.error().unwrap_or_default());
            return Err(e);
        }
    }

    if let Some(link) = session.result_link() {
        info!("{} completed synchronously", file_name);
        cb.on_complete(link);
        return Ok(SubmitOutcome::Completed {
            file_name,
            link: link.to_string(),
        });
    }

    // ── Poll loop ────────────────────────────────────────────────────────
    let job_id = match session.phase() {
        Phase::Polling { job_id } => job_id.clone(),
        other => return Err(ForgeError::Internal(format!("unexpected phase {other:?}"))),
    };
    info!("Polling status of job {}", job_id);
    if let Some(stage) = session.stage() {
        cb.on_stage(stage);
    }

    let poll_every = Duration::from_millis(config.poll_interval_ms);
    let mut poll_ticker = interval_at(Instant::now() + poll_every, poll_every);
    poll_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(poll_ticker);

    while ticks.next().await.is_some() {
        let step = match client.check_status(&job_id).await {
            Ok(status) => session.record_poll(&status),
            Err(e) => {
                warn!("Status poll for job {} failed: {}", job_id, e);
                session.record_poll_error(&e)
            }
        };

        match step {
            PollStep::Continue { attempt } => cb.on_poll(attempt, session.max_poll_attempts()),
            PollStep::Completed { link } => {
                info!("Job {} completed", job_id);
                cb.on_complete(&link);
                return Ok(SubmitOutcome::Completed { file_name, link });
            }
            PollStep::Failed => {
                cb.on_error(session.error().unwrap_or_default());
                return Err(ForgeError::ProcessingFailed);
            }
            PollStep::TimedOut { attempts } => {
                warn!("Job {} still pending after {} polls", job_id, attempts);
                cb.on_error(session.error().unwrap_or_default());
                return Err(ForgeError::PollTimeout { attempts });
            }
        }
    }

    Err(ForgeError::Internal("poll interval stream ended".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::PDF_CONTENT_TYPE;

    #[tokio::test]
    async fn non_pdf_never_reaches_the_network() {
        // Port 9 (discard) is never contacted: validation fails first.
        let config = SubmitConfig::builder()
            .server_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let upload = Upload::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = submit(upload, &config).await.unwrap_err();
        assert!(matches!(err, ForgeError::NotAPdf { .. }));
    }

    #[derive(Default)]
    struct ErrorLog(std::sync::Mutex<Vec<String>>);

    impl SubmitProgressCallback for ErrorLog {
        fn on_error(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[tokio::test]
    async fn rejected_selection_reaches_the_callback() {
        let log = std::sync::Arc::new(ErrorLog::default());
        let config = SubmitConfig::builder()
            .server_url("http://127.0.0.1:9")
            .progress_callback(log.clone())
            .build()
            .unwrap();
        let upload = Upload::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = submit(upload, &config).await.unwrap_err();
        assert!(matches!(err, ForgeError::NotAPdf { .. }));
        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["Please select a valid PDF file".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_file_reaches_the_callback() {
        let log = std::sync::Arc::new(ErrorLog::default());
        let config = SubmitConfig::builder()
            .progress_callback(log.clone())
            .build()
            .unwrap();
        let err = submit_file("/definitely/not/here.pdf", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::FileNotFound { .. }));
        let errors = log.0.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], err.to_string());
    }

    #[tokio::test]
    async fn unreachable_proxy_returns_to_idle() {
        let config = SubmitConfig::builder()
            .server_url("http://127.0.0.1:1")
            .request_timeout_secs(5)
            .build()
            .unwrap();
        let mut session = UploadSession::default();
        session
            .select_file(Upload::new("brief.pdf", PDF_CONTENT_TYPE, b"%PDF".to_vec()))
            .unwrap();
        let err = run_session(&mut session, &config).await.unwrap_err();
        assert!(matches!(err, ForgeError::Transport { .. }));
        assert_eq!(*session.phase(), Phase::Idle);
        assert!(session
            .error()
            .is_some_and(|e| e.starts_with("Failed to submit:")));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let o = SubmitOutcome::Completed {
            file_name: "brief.pdf".into(),
            link: "X".into(),
        };
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["outcome"], "completed");
        assert_eq!(v["link"], "X");
    }
}
