//! Report stream
//!
//! Accumulates human-readable report records (start/pass/fail lines, plus
//! embedded screenshot references as HTML fragments) and writes them out at
//! the end of a run, alongside a machine-readable JSON summary. Every
//! record is mirrored to the tracing sink as it happens, so a crashed run
//! still leaves a trail in the logs.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::info;

use super::RunSummary;

/// File name of the HTML-fragment report.
const REPORT_FILE: &str = "report.html";

/// File name of the JSON run summary.
const SUMMARY_FILE: &str = "summary.json";

/// Collects report records for one run.
pub struct Reporter {
    dir: PathBuf,
    lines: Mutex<Vec<String>>,
}

impl Reporter {
    /// A reporter writing into `dir` when flushed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Append one report record.
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        info!(target: "report", "{line}");
        self.lines.lock().push(line);
    }

    /// Embed a screenshot reference into the report stream.
    pub fn embed_image(&self, path: &Path) {
        let shown = path.display();
        self.log(format!(
            "<a href='{shown}'><img src='{shown}' height='200' width='200'/></a>"
        ));
    }

    /// Snapshot of the records accumulated so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Write the accumulated records as an HTML fragment file.
    pub fn write_html(&self) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(REPORT_FILE);

        let mut body = String::new();
        for line in self.lines.lock().iter() {
            body.push_str(line);
            body.push_str("<br/>\n");
        }

        std::fs::write(&path, body)?;
        Ok(path)
    }

    /// Write the run summary as pretty-printed JSON.
    pub fn write_summary(&self, summary: &RunSummary) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_accumulate_in_order() {
        let reporter = Reporter::new("reports");
        reporter.log("Test started: a");
        reporter.log("Test passed: a");

        let lines = reporter.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Test started: a");
        assert_eq!(lines[1], "Test passed: a");
    }

    #[test]
    fn embedded_image_is_an_html_fragment() {
        let reporter = Reporter::new("reports");
        reporter.embed_image(Path::new("screenshots/case_20240305_174209.png"));

        let lines = reporter.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("<img src='screenshots/case_20240305_174209.png'"));
        assert!(lines[0].starts_with("<a href='"));
    }

    #[test]
    fn flush_writes_report_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path());
        reporter.log("Test started: a");
        reporter.log("Test failed: a: boom");

        let html_path = reporter.write_html().unwrap();
        let html = std::fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("Test failed: a: boom<br/>"));

        let summary = RunSummary { passed: 0, failed: 1 };
        let summary_path = reporter.write_summary(&summary).unwrap();
        let parsed: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(parsed, summary);
    }
}
