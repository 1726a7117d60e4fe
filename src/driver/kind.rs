//! Launchable browser kinds
//!
//! The harness drives browsers over the DevTools protocol, so the closed set
//! of supported kinds is Chromium-family: Chrome, Chromium, Edge. Each kind
//! carries its own executable discovery list per platform.

use std::path::PathBuf;
use std::str::FromStr;

use super::DriverError;

/// A supported browser kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Chromium,
    Edge,
}

impl BrowserKind {
    /// Stable lowercase name, matching the accepted config values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Edge => "edge",
        }
    }

    /// Candidate executable paths for this kind on the current platform.
    fn executable_candidates(&self) -> Vec<PathBuf> {
        if cfg!(target_os = "windows") {
            let mut paths: Vec<PathBuf> = match self {
                Self::Chrome => vec![
                    PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
                    PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
                ],
                Self::Chromium => vec![PathBuf::from(r"C:\Program Files\Chromium\Application\chrome.exe")],
                Self::Edge => vec![
                    PathBuf::from(r"C:\Program Files\Microsoft\Edge\Application\msedge.exe"),
                    PathBuf::from(r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe"),
                ],
            };
            if let Ok(local) = std::env::var("LOCALAPPDATA") {
                let sub = match self {
                    Self::Chrome => r"Google\Chrome\Application\chrome.exe",
                    Self::Chromium => r"Chromium\Application\chrome.exe",
                    Self::Edge => r"Microsoft\Edge\Application\msedge.exe",
                };
                paths.push(PathBuf::from(format!(r"{local}\{sub}")));
            }
            paths
        } else if cfg!(target_os = "macos") {
            match self {
                Self::Chrome => vec![PathBuf::from(
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                )],
                Self::Chromium => vec![PathBuf::from(
                    "/Applications/Chromium.app/Contents/MacOS/Chromium",
                )],
                Self::Edge => vec![PathBuf::from(
                    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
                )],
            }
        } else {
            match self {
                Self::Chrome => vec![
                    PathBuf::from("/usr/bin/google-chrome"),
                    PathBuf::from("/usr/bin/google-chrome-stable"),
                ],
                Self::Chromium => vec![
                    PathBuf::from("/usr/bin/chromium"),
                    PathBuf::from("/usr/bin/chromium-browser"),
                ],
                Self::Edge => vec![
                    PathBuf::from("/usr/bin/microsoft-edge"),
                    PathBuf::from("/usr/bin/microsoft-edge-stable"),
                ],
            }
        }
    }

    /// Find an installed executable for this kind, if any.
    pub fn find_executable(&self) -> Option<PathBuf> {
        self.executable_candidates().into_iter().find(|p| p.exists())
    }
}

impl FromStr for BrowserKind {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "chromium" => Ok(Self::Chromium),
            "edge" => Ok(Self::Edge),
            other => Err(DriverError::UnsupportedKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
