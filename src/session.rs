//! The upload session: what the upload page shows and how it changes.
//!
//! ```text
//!            select/drop (PDF only)
//!   Idle ───────────────────────────▶ Idle (file selected)
//!    │ submit
//!    ▼
//!   Submitting ──link──▶ Completed
//!    │  │  └──error────▶ Idle + error          (timeout-like: stay Submitting)
//!    │  └──jobId──▶ Polling ──completed+link──▶ Completed
//!    │                 │ └────failed / cap────▶ Failed
//! ```
//!
//! The session is pure state: no timers, no I/O. [`crate::submit::submit`]
//! and the embedded page both drive the same transitions; the timers that
//! feed [`UploadSession::advance_stage`] and [`UploadSession::record_poll`]
//! live with the caller.

use crate::error::ForgeError;
use crate::output::{PollStatus, StatusResponse, SubmissionResult};
use crate::upload::{validate_pdf, Upload};
use tracing::debug;

/// Progress labels shown while the upload is in flight, in order.
pub const STAGES: [&str; 7] = [
    "Uploading your content brief...",
    "Analyzing document structure...",
    "Extracting key requirements...",
    "Researching top competitors...",
    "Optimizing for YMYL & SEO...",
    "Generating premium content...",
    "Finalizing your article...",
];

pub const CHECKING_STATUS_STAGE: &str = "Checking processing status...";
pub const STILL_PROCESSING_STAGE: &str = "Still processing - this may take up to 2 minutes...";
pub const STILL_PROCESSING_MESSAGE: &str = "Processing is taking longer than expected. \
Your content is still being generated. Please wait...";

pub const INVALID_SELECTION_MESSAGE: &str = "Please select a valid PDF file";
pub const INVALID_DROP_MESSAGE: &str = "Please drop a valid PDF file";

/// Default cap on non-terminal status polls.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 40;

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling { job_id: String },
    Completed { link: String },
    Failed,
}

/// How a file reached the session; only changes the error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Picker,
    Drop,
}

/// What the caller should do after a status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Keep polling; `attempt` non-terminal polls so far.
    Continue { attempt: u32 },
    Completed { link: String },
    Failed,
    TimedOut { attempts: u32 },
}

/// State of one upload page.
#[derive(Debug, Clone)]
pub struct UploadSession {
    file: Option<Upload>,
    phase: Phase,
    error: Option<String>,
    stage: Option<String>,
    poll_attempts: u32,
    max_poll_attempts: u32,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POLL_ATTEMPTS)
    }
}

impl UploadSession {
    pub fn new(max_poll_attempts: u32) -> Self {
        Self {
            file: None,
            phase: Phase::Idle,
            error: None,
            stage: None,
            poll_attempts: 0,
            max_poll_attempts: max_poll_attempts.max(1),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn file(&self) -> Option<&Upload> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    pub fn max_poll_attempts(&self) -> u32 {
        self.max_poll_attempts
    }

    /// The result link once the session has completed.
    pub fn result_link(&self) -> Option<&str> {
        match &self.phase {
            Phase::Completed { link } => Some(link),
            _ => None,
        }
    }

    /// True while an upload or poll is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Submitting | Phase::Polling { .. })
    }

    // ── File selection ───────────────────────────────────────────────────

    /// Take a file from the picker. Non-PDFs leave the session untouched
    /// apart from the error message.
    pub fn select_file(&mut self, upload: Upload) -> Result<(), ForgeError> {
        self.accept_file(upload, SelectionSource::Picker)
    }

    /// Take a file dropped onto the drop zone.
    pub fn drop_file(&mut self, upload: Upload) -> Result<(), ForgeError> {
        self.accept_file(upload, SelectionSource::Drop)
    }

    fn accept_file(&mut self, upload: Upload, source: SelectionSource) -> Result<(), ForgeError> {
        if let Err(e) = validate_pdf(&upload) {
            self.error = Some(
                match source {
                    SelectionSource::Picker => INVALID_SELECTION_MESSAGE,
                    SelectionSource::Drop => INVALID_DROP_MESSAGE,
                }
                .to_string(),
            );
            return Err(e);
        }
        debug!("Selected {} ({})", upload.file_name, upload.size_label());
        self.file = Some(upload);
        self.error = None;
        Ok(())
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Enter `Submitting` and hand back the file to upload.
    pub fn begin_submit(&mut self) -> Result<Upload, ForgeError> {
        let Some(upload) = self.file.clone() else {
            self.error = Some(ForgeError::NoFileSelected.to_string());
            return Err(ForgeError::NoFileSelected);
        };
        self.phase = Phase::Submitting;
        self.error = None;
        self.stage = Some(STAGES[0].to_string());
        self.poll_attempts = 0;
        Ok(upload)
    }

    /// Move the stage label one step forward; stops at the last stage.
    ///
    /// Returns the new label when it changed.
    pub fn advance_stage(&mut self) -> Option<&str> {
        if self.phase != Phase::Submitting {
            return None;
        }
        let current = self.stage.as_deref()?;
        let idx = STAGES.iter().position(|s| *s == current)?;
        let next = STAGES.get(idx + 1)?;
        self.stage = Some((*next).to_string());
        self.stage.as_deref()
    }

    /// Apply a successful proxy response.
    pub fn on_submitted(&mut self, result: SubmissionResult) {
        match result {
            SubmissionResult::Link { web_view_link } => self.complete(web_view_link),
            SubmissionResult::Job { job_id } => {
                debug!("Upload accepted as job {}", job_id);
                self.phase = Phase::Polling { job_id };
                self.stage = Some(CHECKING_STATUS_STAGE.to_string());
                self.poll_attempts = 0;
            }
        }
    }

    /// Apply a failed upload.
    ///
    /// Timeout-like failures keep the session in `Submitting` with a
    /// "still processing" notice; returns `true` in that case.
    pub fn on_submit_failed(&mut self, err: &ForgeError) -> bool {
        if err.is_timeout_like() {
            self.error = Some(STILL_PROCESSING_MESSAGE.to_string());
            self.stage = Some(STILL_PROCESSING_STAGE.to_string());
            return true;
        }
        self.error = Some(format!("Failed to submit: {err}. Please try again."));
        self.phase = Phase::Idle;
        self.stage = None;
        false
    }

    // ── Polling ──────────────────────────────────────────────────────────

    /// Job id being polled, if any.
    pub fn job_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Polling { job_id } => Some(job_id),
            _ => None,
        }
    }

    /// Apply one status response.
    ///
    /// Every non-terminal response counts toward the cap immediately, so
    /// the cap check always sees the current count.
    pub fn record_poll(&mut self, status: &StatusResponse) -> PollStep {
        if self.job_id().is_none() {
            return PollStep::Failed;
        }
        match (status.status, status.link()) {
            (PollStatus::Completed, Some(link)) => {
                let link = link.to_string();
                self.complete(link.clone());
                PollStep::Completed { link }
            }
            (PollStatus::Failed, _) => {
                self.fail(ForgeError::ProcessingFailed.to_string());
                PollStep::Failed
            }
            _ => self.count_attempt(),
        }
    }

    /// Apply a poll request that failed before producing a status.
    pub fn record_poll_error(&mut self, err: &ForgeError) -> PollStep {
        if self.job_id().is_none() {
            return PollStep::Failed;
        }
        debug!("Status poll failed: {}", err);
        self.count_attempt()
    }

    fn count_attempt(&mut self) -> PollStep {
        self.poll_attempts += 1;
        if self.poll_attempts >= self.max_poll_attempts {
            let attempts = self.poll_attempts;
            self.fail(ForgeError::PollTimeout { attempts }.to_string());
            PollStep::TimedOut { attempts }
        } else {
            PollStep::Continue {
                attempt: self.poll_attempts,
            }
        }
    }

    // ── Terminal transitions ─────────────────────────────────────────────

    fn complete(&mut self, link: String) {
        self.phase = Phase::Completed { link };
        self.stage = None;
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        self.phase = Phase::Failed;
        self.stage = None;
        self.error = Some(message);
    }

    /// Back to a blank form.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_poll_attempts);
    }
}
