//! Progress-callback trait for submission events.
//!
//! Inject an [`Arc<dyn SubmitProgressCallback>`] via
//! [`crate::config::SubmitConfigBuilder::progress_callback`] to receive
//! events as a submission moves through the upload session: stage-label
//! changes while the upload is in flight, each status poll, and the final
//! outcome.
//!
//! The callback is the least-invasive integration point: a terminal spinner,
//! a log line or a channel into another UI can all sit behind it without the
//! library knowing how the host renders progress.
//!
//! # Example
//!
//! ```rust
//! use contentforge::{SubmitConfig, SubmitProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
//!
//! struct PollCounter {
//!     polls: AtomicU32,
//! }
//!
//! impl SubmitProgressCallback for PollCounter {
//!     fn on_poll(&self, attempt: u32, max_attempts: u32) {
//!         self.polls.store(attempt, Ordering::SeqCst);
//!         eprintln!("status check {attempt}/{max_attempts}");
//!     }
//! }
//!
//! let counter = Arc::new(PollCounter { polls: AtomicU32::new(0) });
//!
//! let config = SubmitConfig::builder()
//!     .progress_callback(counter as Arc<dyn SubmitProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by [`crate::submit::submit`] as the session changes state.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait SubmitProgressCallback: Send + Sync {
    /// Called once the upload request is about to be sent.
    ///
    /// # Arguments
    /// * `file_name`: name of the uploaded file
    /// * `size_bytes`: size of the uploaded file
    fn on_submit_start(&self, file_name: &str, size_bytes: usize) {
        let _ = (file_name, size_bytes);
    }

    /// Called whenever the human-readable stage label changes.
    fn on_stage(&self, stage: &str) {
        let _ = stage;
    }

    /// Called after each non-terminal status poll.
    ///
    /// # Arguments
    /// * `attempt`: 1-indexed count of polls so far
    /// * `max_attempts`: cap after which the submission times out
    fn on_poll(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Called once with the result link.
    fn on_complete(&self, link: &str) {
        let _ = link;
    }

    /// Called when the upload timed out at the gateway but work continues upstream.
    fn on_still_processing(&self, message: &str) {
        let _ = message;
    }

    /// Called once with the user-facing error text of a failed submission.
    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl SubmitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SubmitConfig`].
pub type ProgressCallback = Arc<dyn SubmitProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        stages: Mutex<Vec<String>>,
        polls: AtomicU32,
        link: Mutex<Option<String>>,
    }

    impl SubmitProgressCallback for TrackingCallback {
        fn on_stage(&self, stage: &str) {
            self.stages.lock().unwrap().push(stage.to_string());
        }

        fn on_poll(&self, attempt: u32, _max_attempts: u32) {
            self.polls.store(attempt, Ordering::SeqCst);
        }

        fn on_complete(&self, link: &str) {
            *self.link.lock().unwrap() = Some(link.to_string());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_submit_start("brief.pdf", 1024);
        cb.on_stage("Uploading your content brief...");
        cb.on_poll(1, 40);
        cb.on_still_processing("still going");
        cb.on_error("boom");
        cb.on_complete("https://docs.example/d/1");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_stage("a");
        tracker.on_stage("b");
        tracker.on_poll(1, 40);
        tracker.on_poll(2, 40);
        tracker.on_complete("X");

        assert_eq!(*tracker.stages.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(tracker.polls.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.link.lock().unwrap().as_deref(), Some("X"));
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage("x");
        cb.on_poll(3, 40);
    }
}
