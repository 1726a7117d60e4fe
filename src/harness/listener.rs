//! Test lifecycle listener
//!
//! Observes one case's events: `Started -> {Passed, Failed}`, terminal. On
//! start it writes a report record; on a terminal event it writes a record
//! and, when the outcome calls for it, runs the capture hook and embeds the
//! resulting screenshot. Nothing that happens in here — a missing session,
//! a failed capture — ever propagates to the runner.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{CaseStatus, Reporter};
use crate::driver::CaptureError;

/// Observer for case lifecycle events.
pub struct RunListener {
    report: Arc<Reporter>,
    screenshot_on_pass: bool,
}

impl RunListener {
    pub fn new(report: Arc<Reporter>, screenshot_on_pass: bool) -> Self {
        Self {
            report,
            screenshot_on_pass,
        }
    }

    /// A case began executing.
    pub fn on_case_started(&self, case: &str) {
        self.report.log(format!("Test started: {case}"));
    }

    /// A case reached a terminal state.
    ///
    /// `capture` resolves the case's session: it returns `None` when no
    /// session is attached (nothing to photograph), or a future producing
    /// the screenshot path. Capture runs on failure always and on success
    /// only when configured; its errors are logged and dropped here.
    pub async fn on_case_finished<F, Fut>(
        &self,
        case: &str,
        status: CaseStatus,
        detail: Option<&str>,
        capture: F,
    ) where
        F: FnOnce() -> Option<Fut>,
        Fut: Future<Output = Result<PathBuf, CaptureError>>,
    {
        match (status, detail) {
            (CaseStatus::Passed, _) => self.report.log(format!("Test passed: {case}")),
            (CaseStatus::Failed, Some(reason)) => {
                self.report.log(format!("Test failed: {case}: {reason}"))
            }
            (CaseStatus::Failed, None) => self.report.log(format!("Test failed: {case}")),
        }

        let wants_screenshot = status == CaseStatus::Failed || self.screenshot_on_pass;
        if !wants_screenshot {
            return;
        }

        match capture() {
            None => debug!("No session attached to {case}, skipping screenshot"),
            Some(fut) => match fut.await {
                Ok(path) => self.report.embed_image(&path),
                Err(e) => warn!("Screenshot for {case} failed (report continues): {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn listener(screenshot_on_pass: bool) -> (RunListener, Arc<Reporter>) {
        let report = Arc::new(Reporter::new("reports"));
        (RunListener::new(report.clone(), screenshot_on_pass), report)
    }

    #[tokio::test]
    async fn started_then_failed_logs_twice_and_captures_once() {
        let (listener, report) = listener(false);
        let attempts = AtomicUsize::new(0);

        listener.on_case_started("search_validation_1");
        listener
            .on_case_finished(
                "search_validation_1",
                CaseStatus::Failed,
                Some("counts differ"),
                || {
                    Some(async {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err::<PathBuf, _>(CaptureError::Capture("no frame".into()))
                    })
                },
            )
            .await;

        let lines = report.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Test started: search_validation_1");
        assert_eq!(lines[1], "Test failed: search_validation_1: counts differ");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pass_without_configured_capture_skips_the_hook() {
        let (listener, report) = listener(false);
        let attempts = AtomicUsize::new(0);

        listener.on_case_started("case");
        listener
            .on_case_finished("case", CaseStatus::Passed, None, || {
                Some(async {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok(PathBuf::from("unused.png"))
                })
            })
            .await;

        assert_eq!(report.lines().len(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pass_with_configured_capture_embeds_the_image() {
        let (listener, report) = listener(true);

        listener
            .on_case_finished("case", CaseStatus::Passed, None, || {
                Some(async { Ok(PathBuf::from("screenshots/case_20240305_174209.png")) })
            })
            .await;

        let lines = report.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("case_20240305_174209.png"));
        assert!(lines[1].contains("<img"));
    }

    #[tokio::test]
    async fn absent_session_skips_capture_silently() {
        let (listener, report) = listener(true);

        listener
            .on_case_finished(
                "case",
                CaseStatus::Failed,
                None,
                || None::<std::future::Ready<Result<PathBuf, CaptureError>>>,
            )
            .await;

        assert_eq!(report.lines().len(), 1);
    }
}
