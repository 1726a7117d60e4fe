//! Browser session management
//!
//! Launches and controls one Chromium-family browser instance over the
//! DevTools protocol. A session is exclusively owned by the test case that
//! created it and is destroyed on every exit path of that case.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{BrowserKind, DriverError};

/// Sequential session naming (session-1, session-2, ...)
static SESSION_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Upper bound for a single script evaluation.
const EVAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Explicit path to the browser executable; discovered per kind if unset
    pub executable: Option<PathBuf>,
    /// Run without a visible window
    pub headless: bool,
    /// Profile directory; a throwaway one is used if unset
    pub user_data_dir: Option<PathBuf>,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Upper bound for the launch itself, in seconds
    pub launch_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: false,
            user_data_dir: None,
            window_width: 1920,
            window_height: 1080,
            launch_timeout_secs: 45,
        }
    }
}

impl SessionConfig {
    /// Create config for one case execution with a throwaway profile
    /// directory, so no state leaks between cases.
    pub fn for_case(case: &str) -> Self {
        let dir = std::env::temp_dir()
            .join("webcheck")
            .join("browser_data")
            .join(format!("{}_{}", Uuid::new_v4(), sanitize(case)));

        Self {
            user_data_dir: Some(dir),
            ..Default::default()
        }
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set an explicit browser executable
    pub fn executable(mut self, path: Option<PathBuf>) -> Self {
        self.executable = path;
        self
    }

    /// Set the window size
    pub fn window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }
}

/// Strip path-hostile characters from a case label.
fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// One live browser automation session.
pub struct BrowserSession {
    /// Display name, e.g. "session-1"
    id: String,
    /// Kind this session was launched as
    kind: BrowserKind,
    /// The browser process handle; taken out on close
    browser: Arc<RwLock<Option<Browser>>>,
    /// The single page this session drives
    page: Page,
    /// Cleared when the browser disconnects or the session is closed
    alive: Arc<AtomicBool>,
}

impl BrowserSession {
    /// Launch a new browser session of the given kind.
    ///
    /// Resolves the executable for `kind`, starts the browser with the
    /// configured window size, and takes ownership of its initial tab.
    pub async fn launch(kind: BrowserKind, config: &SessionConfig) -> Result<Self, DriverError> {
        let session_id = format!("session-{}", SESSION_COUNTER.fetch_add(1, Ordering::Relaxed));

        let executable = match config.executable.clone().or_else(|| kind.find_executable()) {
            Some(path) => path,
            None => {
                return Err(DriverError::LaunchFailed(format!(
                    "no {kind} executable found; install it or set an explicit path"
                )))
            }
        };

        info!(
            "Launching {} session {} (headless: {})",
            kind, session_id, config.headless
        );

        let mut builder = BrowserConfig::builder();

        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder.chrome_executable(&executable);

        if let Some(ref dir) = config.user_data_dir {
            std::fs::create_dir_all(dir)?;
            builder = builder.user_data_dir(dir);
        }

        builder = builder
            .window_size(config.window_width, config.window_height)
            .arg("--start-maximized")
            .arg("--no-default-browser-check")
            .arg("--disable-notifications")
            .arg("--no-sandbox");

        let browser_config = builder
            .build()
            .map_err(DriverError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

        // Drain the CDP event stream; when it ends the browser is gone.
        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive.clone();
        let id_for_handler = session_id.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            warn!("Session {} browser disconnected", id_for_handler);
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // The browser opens with a blank tab; take the first page and close
        // any extras.
        let page = {
            let mut pages = browser
                .pages()
                .await
                .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

            let main_page = if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| DriverError::LaunchFailed(e.to_string()))?
            };

            for extra in pages {
                debug!("Session {} closing extra blank tab", session_id);
                let _ = extra.close().await;
            }

            main_page
        };

        info!("Browser session {} created ({})", session_id, executable.display());

        Ok(Self {
            id: session_id,
            kind,
            browser: Arc::new(RwLock::new(Some(browser))),
            page,
            alive,
        })
    }

    /// Session display name
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Kind this session was launched as
    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    /// Whether the browser is still connected
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Navigate to a URL and wait for the load to settle.
    pub async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!("Session {} navigating to: {}", self.id, url);
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::NavigationFailed(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| DriverError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    /// Current page URL
    pub async fn current_url(&self) -> Result<String, DriverError> {
        self.page
            .url()
            .await
            .map_err(|e| DriverError::ConnectionLost(e.to_string()))?
            .ok_or_else(|| DriverError::ConnectionLost("no URL".into()))
    }

    /// Evaluate a script on the page, returning its JSON value.
    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        let result = tokio::time::timeout(EVAL_TIMEOUT, self.page.evaluate(script))
            .await
            .map_err(|_| DriverError::Script(format!("evaluation timed out after {EVAL_TIMEOUT:?}")))?
            .map_err(|e| DriverError::Script(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Scroll the page to the bottom. Lazy-loaded result lists fill in on
    /// scroll, so the scenario does this after collecting each page.
    pub async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await?;
        Ok(())
    }

    /// Find a single element by CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element, DriverError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| DriverError::ElementNotFound(format!("{selector}: {e}")))
    }

    /// Find all elements matching a CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::ElementNotFound(format!("{selector}: {e}")))
    }

    /// Find all descendants of an element matching a CSS selector.
    pub async fn find_children(
        &self,
        element: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, DriverError> {
        element
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::ElementNotFound(format!("{selector}: {e}")))
    }

    /// Rendered text of an element. Missing text is an empty string.
    pub async fn text_of(&self, element: &Element) -> Result<String, DriverError> {
        Ok(element
            .inner_text()
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?
            .unwrap_or_default())
    }

    /// Click an element.
    pub async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element
            .click()
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(())
    }

    /// Focus an element and type text into it.
    pub async fn type_into(&self, element: &Element, text: &str) -> Result<(), DriverError> {
        element
            .click()
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(())
    }

    /// Submit via the keyboard, Enter on the given element.
    pub async fn submit(&self, element: &Element) -> Result<(), DriverError> {
        element
            .press_key("Enter")
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(())
    }

    /// Whether an element is still attached to the current document.
    ///
    /// A navigation destroys the execution context the element handle lives
    /// in; the resulting protocol error is the detachment signal, same as an
    /// explicit `isConnected == false`.
    pub async fn is_attached(&self, element: &Element) -> bool {
        match element
            .call_js_fn("function() { return this.isConnected; }", false)
            .await
        {
            Ok(ret) => ret
                .result
                .value
                .as_ref()
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Whether an element is visible and enabled, i.e. ready for input.
    pub async fn is_interactable(&self, element: &Element) -> bool {
        let probe = "function() {\
            if (!this.isConnected) return false;\
            if (this.disabled) return false;\
            const style = window.getComputedStyle(this);\
            if (style.display === 'none' || style.visibility === 'hidden') return false;\
            const rect = this.getBoundingClientRect();\
            return rect.width > 0 && rect.height > 0;\
        }";
        match element.call_js_fn(probe, false).await {
            Ok(ret) => ret
                .result
                .value
                .as_ref()
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Capture the current viewport as PNG bytes.
    pub async fn screenshot_png(&self) -> Result<Vec<u8>, DriverError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
            )
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    /// Gracefully shut the browser down.
    ///
    /// The process handle is taken out of the session first, so a second
    /// close (or a close after a crash) is a no-op.
    pub async fn close(&self) -> Result<(), DriverError> {
        let taken = {
            let mut guard = self.browser.write().await;
            guard.take()
        };

        self.alive.store(false, Ordering::Relaxed);

        if let Some(mut browser) = taken {
            browser
                .close()
                .await
                .map_err(|e| DriverError::ConnectionLost(e.to_string()))?;
            browser.wait().await?;
            info!("Session {} closed", self.id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_case_uses_throwaway_profile_dir() {
        let config = SessionConfig::for_case("search_validation[0]");
        let dir = config.user_data_dir.expect("profile dir set");
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("search_validation_0_"));
        assert!(dir.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn sanitize_keeps_word_chars_only() {
        assert_eq!(sanitize("case[3]/x"), "case_3__x");
        assert_eq!(sanitize("plain-name_1"), "plain-name_1");
    }

    #[test]
    fn default_config_matches_launch_contract() {
        let config = SessionConfig::default();
        assert!(!config.headless);
        assert_eq!((config.window_width, config.window_height), (1920, 1080));
        assert_eq!(config.launch_timeout_secs, 45);
    }
}
