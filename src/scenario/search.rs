//! Search-and-paginate validation
//!
//! The flow under test:
//!
//! 1. Wait for the search input, type the search term, submit.
//! 2. Collect the result sections on page 1; assert the section count and
//!    that every item's text contains the term case-insensitively.
//! 3. Page to 2: click, wait for the old first section to go stale (the
//!    navigation-complete signal), re-collect.
//! 4. Page to 3 the same way.
//! 5. Assert the page 2 and page 3 result counts match.
//!
//! Any failed step aborts the scenario; the listener handles the screenshot.

use std::time::Duration;

use chromiumoxide::Element;
use thiserror::Error;
use tracing::info;

use crate::config::{Locators, Settings};
use crate::driver::{BrowserSession, DriverError, WaitError, Waiter};
use crate::harness::Reporter;

/// Scenario failures. `Assertion` is the primary pass/fail signal; the
/// other variants surface infrastructure faults that abort the flow.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("{0}")]
    Assertion(String),
}

/// One execution of the search validation flow against a live session.
pub struct SearchScenario<'a> {
    session: &'a BrowserSession,
    settings: &'a Settings,
    locators: &'a Locators,
    report: &'a Reporter,
}

impl<'a> SearchScenario<'a> {
    pub fn new(
        session: &'a BrowserSession,
        settings: &'a Settings,
        locators: &'a Locators,
        report: &'a Reporter,
    ) -> Self {
        Self {
            session,
            settings,
            locators,
            report,
        }
    }

    fn waiter(&self) -> Waiter<'a> {
        Waiter::new(
            self.session,
            Duration::from_secs(self.settings.wait_timeout_seconds),
        )
    }

    /// Run the flow for one search term.
    pub async fn run(&self, term: &str) -> Result<(), ScenarioError> {
        let waiter = self.waiter();

        // Search
        let input = waiter.interactable(&self.locators.search_input).await?;
        self.session.type_into(&input, term).await?;
        self.session.submit(&input).await?;

        // Page 1: collect, scroll, validate
        let sections = waiter.all_present(&self.locators.results_sections).await?;
        self.session.scroll_to_bottom().await?;
        self.report
            .log(format!("Number of related sections: {}", sections.len()));
        ensure_min_sections(sections.len(), self.settings.min_related_sections)?;

        for section in &sections {
            let items = self
                .session
                .find_children(section, &self.locators.result_items)
                .await?;
            for item in &items {
                let text = self.session.text_of(item).await?;
                ensure_item_contains(&text, term)?;
            }
        }
        self.report
            .log(format!("All related search items contain the word: {term}"));

        // Pages 2 and 3: same staleness-then-recollect pattern
        let page2 = self
            .open_page(&sections[0], &self.locators.page2_button, 2)
            .await?;
        let page3 = self
            .open_page(&page2[0], &self.locators.page3_button, 3)
            .await?;

        ensure_counts_match(page2.len(), page3.len())?;
        self.report.log(format!(
            "Page 2 results: {} | Page 3 results: {}",
            page2.len(),
            page3.len()
        ));

        Ok(())
    }

    /// Click a pagination control, wait for the previous page's first
    /// section to detach, then collect the new page's sections.
    async fn open_page(
        &self,
        previous_first: &Element,
        button: &str,
        page: u8,
    ) -> Result<Vec<Element>, ScenarioError> {
        let waiter = self.waiter();

        let control = waiter.interactable(button).await?;
        self.session.click(&control).await?;
        waiter.stale(previous_first).await?;
        info!(
            "Session {} navigated to page {} of search results",
            self.session.id(),
            page
        );

        let results = waiter.all_present(&self.locators.results_sections).await?;
        self.report
            .log(format!("Number of results on Page {page}: {}", results.len()));
        self.session.scroll_to_bottom().await?;

        Ok(results)
    }
}

/// Case-insensitive containment check used for item validation.
fn contains_term(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(&term.to_lowercase())
}

fn ensure_item_contains(text: &str, term: &str) -> Result<(), ScenarioError> {
    if contains_term(text, term) {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(format!(
            "item does not contain search word `{term}`: {text}"
        )))
    }
}

fn ensure_min_sections(found: usize, min: usize) -> Result<(), ScenarioError> {
    if found >= min {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(format!(
            "expected at least {min} related sections, but found: {found}"
        )))
    }
}

fn ensure_counts_match(page2: usize, page3: usize) -> Result<(), ScenarioError> {
    if page2 == page3 {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(format!(
            "result counts differ between pages: page 2 has {page2}, page 3 has {page3}"
        )))
    }
}
