//! Screenshot capture
//!
//! Writes a point-in-time viewport image to the screenshot directory as
//! `<label>_<yyyyMMdd_HHmmss>.png`. Capture returns an explicit `Result`
//! rather than throwing through the caller: the listener logs a failure and
//! moves on, so capture can never block teardown. Two captures with the
//! same label in the same second collide; that is accepted, not papered
//! over.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use super::{BrowserSession, CaptureError};

/// Captures screenshots into one output directory.
#[derive(Debug, Clone)]
pub struct Screenshots {
    dir: PathBuf,
}

impl Screenshots {
    /// A capturer writing into `dir`. The directory is created on first
    /// capture, not here, so constructing one is infallible.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture the session's current viewport and write it out. Returns the
    /// path of the written file.
    pub async fn capture(
        &self,
        session: &BrowserSession,
        label: &str,
    ) -> Result<PathBuf, CaptureError> {
        let png = session
            .screenshot_png()
            .await
            .map_err(|e| CaptureError::Capture(e.to_string()))?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name(label, Local::now()));
        std::fs::write(&path, png)?;

        info!("Session {} screenshot saved to {}", session.id(), path.display());
        Ok(path)
    }
}

/// Compose the timestamped file name for a capture.
fn file_name(label: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.png", label, at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_is_label_and_second_resolution_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 17, 42, 9).unwrap();
        assert_eq!(file_name("search_validation", at), "search_validation_20240305_174209.png");
    }

    #[test]
    fn same_second_same_label_collides() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 17, 42, 9).unwrap();
        assert_eq!(file_name("case", at), file_name("case", at));
    }
}
