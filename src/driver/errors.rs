//! Driver error types

use thiserror::Error;

/// Driver-related errors
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("unsupported browser kind: {0}")]
    UnsupportedKind(String),

    #[error("a session is already bound to this manager")]
    SessionAlreadyBound,

    #[error("failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Screenshot capture failure. Never propagated past the listener — callers
/// log it and move on so capture can never block teardown.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("screenshot capture failed: {0}")]
    Capture(String),

    #[error("failed to write screenshot: {0}")]
    Io(#[from] std::io::Error),
}
