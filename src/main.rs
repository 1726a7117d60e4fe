//! Harness entry point
//!
//! Loads both configuration sets eagerly, then runs the search validation
//! suite. The process exit code reflects the tally: nonzero when any case
//! failed.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use webcheck::config::{Locators, Settings, LOCATORS_PATH, SETTINGS_PATH};
use webcheck::harness::{Reporter, SuiteRunner, TestCase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = webcheck::init_logging();

    info!("Starting webcheck");

    // Configuration is loaded once, here, before any case starts; the rest
    // of the process only ever sees these immutable references.
    let settings =
        Arc::new(Settings::load(SETTINGS_PATH).context("loading runtime settings")?);
    let locators =
        Arc::new(Locators::load(LOCATORS_PATH).context("loading element locators")?);

    info!(
        "Target: {} ({}, headless: {})",
        settings.testurl, settings.browser, settings.headless
    );

    let report = Arc::new(Reporter::new(&settings.report_dir));
    let runner = SuiteRunner::new(settings, locators, report);

    let case = TestCase::new("search_validation", "search_validation");
    let summary = runner
        .run(&case)
        .await
        .context("running the search validation suite")?;

    info!(
        "Run complete: {} passed, {} failed",
        summary.passed, summary.failed
    );

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
