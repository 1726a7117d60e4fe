//! Case outcome events and the run tally

/// Terminal status of one case execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseStatus {
    Passed,
    Failed,
}

/// Pass/fail tally for a whole run.
///
/// Deliberately nothing more than counts; richer aggregation is out of
/// scope for this harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub passed: u64,
    pub failed: u64,
}

impl RunSummary {
    /// Record one finished case.
    pub fn record(&mut self, status: CaseStatus) {
        match status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed => self.failed += 1,
        }
    }

    /// Total cases recorded.
    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }
}
