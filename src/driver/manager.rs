//! Per-case session binding
//!
//! `DriverManager` is the explicit context object that owns the one session
//! a test case may hold. It replaces ambient thread-local driver storage:
//! each case execution constructs its own manager, so a binding can never
//! leak into the next case.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::{BrowserKind, BrowserSession, DriverError, SessionConfig};

/// Owns at most one live [`BrowserSession`].
///
/// Invariant: one binding at a time. `acquire` on an already-bound manager
/// fails; `release` always clears the binding, even when shutdown fails.
pub struct DriverManager {
    config: SessionConfig,
    bound: Option<Arc<BrowserSession>>,
}

impl DriverManager {
    /// Create an unbound manager for one case execution.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            bound: None,
        }
    }

    /// Launch a session of the given kind, navigate it to `base_url`, and
    /// bind it to this manager.
    ///
    /// Fails with [`DriverError::SessionAlreadyBound`] if a session is
    /// already bound, and with [`DriverError::LaunchFailed`] when the
    /// browser does not come up within the configured launch timeout. On
    /// any failure nothing stays bound.
    pub async fn acquire(
        &mut self,
        kind: BrowserKind,
        base_url: &str,
    ) -> Result<Arc<BrowserSession>, DriverError> {
        if self.bound.is_some() {
            return Err(DriverError::SessionAlreadyBound);
        }

        let launch_timeout = Duration::from_secs(self.config.launch_timeout_secs);
        let session = tokio::time::timeout(launch_timeout, BrowserSession::launch(kind, &self.config))
            .await
            .map_err(|_| {
                DriverError::LaunchFailed(format!(
                    "browser launch timed out after {}s",
                    self.config.launch_timeout_secs
                ))
            })??;

        let session = Arc::new(session);

        if let Err(e) = session.navigate(base_url).await {
            // The session never becomes visible to the caller; shut it down
            // here, swallowing teardown faults the same way release() does.
            if let Err(close_err) = session.close().await {
                warn!(
                    "Session {} teardown after failed navigation also failed: {}",
                    session.id(),
                    close_err
                );
            }
            return Err(e);
        }

        self.bound = Some(session.clone());
        Ok(session)
    }

    /// The session bound to this manager, if any.
    pub fn current(&self) -> Option<Arc<BrowserSession>> {
        self.bound.clone()
    }

    /// Gracefully shut down the bound session, if any.
    ///
    /// Shutdown failures are logged and swallowed; the binding is cleared on
    /// every path. Releasing an unbound manager is a no-op, so calling this
    /// twice is always safe.
    pub async fn release(&mut self) {
        let Some(session) = self.bound.take() else {
            return;
        };

        if let Err(e) = session.close().await {
            warn!("Session {} shutdown failed (binding cleared): {}", session.id(), e);
        }
    }
}
