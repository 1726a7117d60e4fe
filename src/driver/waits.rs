//! Bounded waits
//!
//! Every blocking wait in a scenario goes through [`Waiter`]: a fixed-rate
//! poll under one deadline. On expiry the wait fails with
//! [`WaitError::Timeout`], which aborts the scenario — there is no other
//! cancellation mechanism.

use std::time::Duration;

use chromiumoxide::Element;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use super::{BrowserSession, DriverError};

/// Interval between poll attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Wait failures
#[derive(Error, Debug)]
pub enum WaitError {
    #[error("timed out after {timeout:?} waiting for {condition}")]
    Timeout {
        condition: String,
        timeout: Duration,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Polls a session for a condition until a deadline.
pub struct Waiter<'a> {
    session: &'a BrowserSession,
    timeout: Duration,
}

impl<'a> Waiter<'a> {
    /// A waiter bounded by `timeout` for every wait it performs.
    pub fn new(session: &'a BrowserSession, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Wait until the element matching `selector` is visible and enabled,
    /// and return it.
    pub async fn interactable(&self, selector: &str) -> Result<Element, WaitError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Ok(element) = self.session.find_element(selector).await {
                if self.session.is_interactable(&element).await {
                    return Ok(element);
                }
            }

            if !self.tick(deadline).await {
                return Err(self.timed_out(format!("element `{selector}` to be interactable")));
            }
        }
    }

    /// Wait until at least one element matches `selector`, and return all
    /// matches.
    pub async fn all_present(&self, selector: &str) -> Result<Vec<Element>, WaitError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Ok(elements) = self.session.find_elements(selector).await {
                if !elements.is_empty() {
                    debug!(
                        "Session {} found {} elements for `{}`",
                        self.session.id(),
                        elements.len(),
                        selector
                    );
                    return Ok(elements);
                }
            }

            if !self.tick(deadline).await {
                return Err(self.timed_out(format!("presence of `{selector}`")));
            }
        }
    }

    /// Wait until a previously-captured element detaches from the document.
    ///
    /// Used after triggering navigation: the old element going stale is the
    /// signal that the page transition completed.
    pub async fn stale(&self, element: &Element) -> Result<(), WaitError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if !self.session.is_attached(element).await {
                return Ok(());
            }

            if !self.tick(deadline).await {
                return Err(self.timed_out("element to become stale".to_string()));
            }
        }
    }

    /// Sleep one poll interval. Returns false once the deadline has passed.
    async fn tick(&self, deadline: Instant) -> bool {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - Instant::now())).await;
        true
    }

    fn timed_out(&self, condition: String) -> WaitError {
        WaitError::Timeout {
            condition,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_error_names_the_condition() {
        let err = WaitError::Timeout {
            condition: "presence of `section.results`".to_string(),
            timeout: Duration::from_secs(10),
        };
        let msg = err.to_string();
        assert!(msg.contains("section.results"));
        assert!(msg.contains("10s"));
    }
}
