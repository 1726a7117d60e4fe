//! webcheck
//!
//! A browser-driven UI test harness: launches a Chromium-family browser
//! over the DevTools protocol, runs a parameterized search validation
//! scenario fed by workbook rows, and captures screenshots on terminal
//! test events.

pub mod config;
pub mod data;
pub mod driver;
pub mod harness;
pub mod scenario;

use std::path::PathBuf;

/// Get log directory path (shared across modules)
pub fn log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Initialize logging: console output plus a daily-rolling file in
/// [`log_dir`]. Returns the appender guard; drop it only at process exit or
/// buffered log lines are lost.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    let log_dir = log_dir();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "webcheck.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}
