//! Suite runner
//!
//! Executes one registered test case once per data row: acquire a fresh
//! session, run the scenario, hand the outcome to the listener, release the
//! session. Cases run sequentially; the result of a run is nothing more
//! than a pass/fail tally.

use std::sync::Arc;

use tracing::{info, warn};

use super::{CaseStatus, Reporter, RunListener, RunSummary};
use crate::config::{Locators, Settings};
use crate::data::{DataError, Workbook};
use crate::driver::{DriverManager, Screenshots, SessionConfig};
use crate::scenario::{ScenarioError, SearchScenario};

/// A registered test case: a display name plus the worksheet that feeds it.
///
/// The sheet mapping is explicit — supplied here, never derived from the
/// executing function's name.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub sheet: String,
}

impl TestCase {
    pub fn new(name: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheet: sheet.into(),
        }
    }
}

/// Runs the search validation suite.
pub struct SuiteRunner {
    settings: Arc<Settings>,
    locators: Arc<Locators>,
    report: Arc<Reporter>,
    listener: RunListener,
    screenshots: Screenshots,
    workbook: Workbook,
}

impl SuiteRunner {
    pub fn new(settings: Arc<Settings>, locators: Arc<Locators>, report: Arc<Reporter>) -> Self {
        let listener = RunListener::new(report.clone(), settings.screenshot_on_pass);
        let screenshots = Screenshots::new(&settings.screenshot_dir);
        let workbook = Workbook::new(&settings.testdata_file);

        Self {
            settings,
            locators,
            report,
            listener,
            screenshots,
            workbook,
        }
    }

    /// Run `case` once per data row and flush the report.
    ///
    /// Data provider failures abort the run before any browser launches;
    /// everything after that is tallied, never propagated.
    pub async fn run(&self, case: &TestCase) -> Result<RunSummary, DataError> {
        let rows = self.workbook.rows_for(&case.sheet)?;
        if rows.is_empty() {
            warn!("Sheet `{}` has no data rows, nothing to run", case.sheet);
        }

        let mut summary = RunSummary::default();
        for (index, row) in rows.iter().enumerate() {
            let label = format!("{}_{}", case.name, index + 1);
            let status = self.run_one(&label, row).await;
            summary.record(status);
        }

        self.report.log(format!(
            "Run finished: {} passed, {} failed",
            summary.passed, summary.failed
        ));
        if let Err(e) = self.report.write_html() {
            warn!("Failed to write report file: {e}");
        }
        if let Err(e) = self.report.write_summary(&summary) {
            warn!("Failed to write run summary: {e}");
        }

        Ok(summary)
    }

    /// Execute one parameterized case: full session lifecycle, listener
    /// notifications, guaranteed release.
    async fn run_one(&self, label: &str, row: &[String]) -> CaseStatus {
        info!("Running case {}", label);
        self.listener.on_case_started(label);

        let config = SessionConfig::for_case(label).headless(self.settings.headless);
        let mut manager = DriverManager::new(config);

        let result = self.execute(&mut manager, row).await;

        let (status, detail) = match &result {
            Ok(()) => (CaseStatus::Passed, None),
            Err(e) => (CaseStatus::Failed, Some(e.to_string())),
        };

        // The capture hook resolves the session from the manager; when
        // acquisition itself failed there is nothing bound and the listener
        // skips the screenshot.
        let session = manager.current();
        let screenshots = self.screenshots.clone();
        let shot_label = label.to_string();
        self.listener
            .on_case_finished(label, status, detail.as_deref(), move || {
                session.map(|s| async move { screenshots.capture(&s, &shot_label).await })
            })
            .await;

        manager.release().await;
        status
    }

    async fn execute(
        &self,
        manager: &mut DriverManager,
        row: &[String],
    ) -> Result<(), ScenarioError> {
        // Column 0 of the data row is the search term.
        let term = row.first().cloned().unwrap_or_default();

        let session = manager
            .acquire(self.settings.browser, &self.settings.testurl)
            .await?;

        SearchScenario::new(&session, &self.settings, &self.locators, &self.report)
            .run(&term)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BrowserKind;
    use std::path::PathBuf;

    fn settings(testdata: PathBuf) -> Arc<Settings> {
        Arc::new(Settings {
            testurl: "http://localhost:0".to_string(),
            wait_timeout_seconds: 1,
            min_related_sections: 1,
            browser: BrowserKind::Chrome,
            headless: true,
            screenshot_on_pass: false,
            screenshot_dir: PathBuf::from("screenshots"),
            testdata_file: testdata,
            report_dir: PathBuf::from("reports"),
        })
    }

    fn locators() -> Arc<Locators> {
        Arc::new(Locators {
            search_input: "#search".to_string(),
            results_sections: "section.results".to_string(),
            result_items: "li.item".to_string(),
            page2_button: "#page2".to_string(),
            page3_button: "#page3".to_string(),
        })
    }

    #[tokio::test]
    async fn missing_workbook_aborts_before_any_browser() {
        let report = Arc::new(Reporter::new("reports"));
        let runner = SuiteRunner::new(
            settings(PathBuf::from("testdata/absent.xlsx")),
            locators(),
            report.clone(),
        );

        let case = TestCase::new("search_validation", "search_validation");
        let result = runner.run(&case).await;

        assert!(matches!(result, Err(DataError::FileUnavailable { .. })));
        assert!(report.lines().is_empty());
    }
}
