//! Harness configuration
//!
//! Two property files drive a run: `config/config.properties` (runtime
//! settings) and `config/locators.properties` (element selectors). Both are
//! loaded eagerly, once, before any case starts, and the resulting structs
//! are immutable — they are shared by reference for the rest of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::driver::BrowserKind;

/// Default location of the runtime settings file, relative to the working directory.
pub const SETTINGS_PATH: &str = "config/config.properties";

/// Default location of the locator file, relative to the working directory.
pub const LOCATORS_PATH: &str = "config/locators.properties";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required key `{0}`")]
    MissingKey(String),

    #[error("invalid value `{value}` for key `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Parse `.properties`-style text: one `key=value` (or `key: value`) per
/// line, `#` and `!` comment lines, surrounding whitespace ignored.
fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some(split) = line.find(['=', ':']) else {
            continue;
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        if !key.is_empty() {
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}

/// A loaded property set with typed accessors.
struct Properties {
    map: HashMap<String, String>,
}

impl Properties {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unavailable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            map: parse_properties(&text),
        })
    }

    fn required(&self, key: &str) -> Result<&str, ConfigError> {
        self.map
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    fn required_parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required(key)?;
        raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    fn optional_parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.map.get(key) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn optional_path(&self, key: &str, default: &str) -> PathBuf {
        self.map
            .get(key)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default))
    }
}

/// Runtime settings for a harness run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Navigation target opened at session start.
    pub testurl: String,
    /// Upper bound for every blocking wait, in seconds.
    pub wait_timeout_seconds: u64,
    /// Minimum number of result sections the scenario asserts on page 1.
    pub min_related_sections: usize,
    /// Browser to launch.
    pub browser: BrowserKind,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Also capture a screenshot when a case passes.
    pub screenshot_on_pass: bool,
    /// Directory screenshots are written to.
    pub screenshot_dir: PathBuf,
    /// Workbook file the data provider reads.
    pub testdata_file: PathBuf,
    /// Directory the report stream is written to.
    pub report_dir: PathBuf,
}

impl Settings {
    /// Load settings from a property file. Fails hard: a run without a
    /// readable, complete configuration never starts.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let props = Properties::load(path)?;

        let browser_raw = props.required("browser")?;
        let browser =
            BrowserKind::from_str(browser_raw).map_err(|e| ConfigError::InvalidValue {
                key: "browser".to_string(),
                value: browser_raw.to_string(),
                reason: e.to_string(),
            })?;

        let settings = Self {
            testurl: props.required("testurl")?.to_string(),
            wait_timeout_seconds: props.required_parsed("wait_timeout_seconds")?,
            min_related_sections: props.required_parsed("min_related_sections")?,
            browser,
            headless: props.optional_parsed("headless", false)?,
            screenshot_on_pass: props.optional_parsed("screenshot_on_pass", false)?,
            screenshot_dir: props.optional_path("screenshot_dir", "screenshots"),
            testdata_file: props.optional_path("testdata_file", "testdata/testdata.xlsx"),
            report_dir: props.optional_path("report_dir", "reports"),
        };

        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Element selectors for the search scenario, keyed as in the locator file.
///
/// Values are CSS selectors; the driver resolves them via `querySelector`.
#[derive(Debug, Clone)]
pub struct Locators {
    /// `SEARCH_ID` — the search input.
    pub search_input: String,
    /// `SEARCH_RESULTS` — the collection of result sections.
    pub results_sections: String,
    /// `SEARCH_ITEMS_RESULTS` — items inside one result section.
    pub result_items: String,
    /// `PAGE_2_BTN` — pagination control for page 2.
    pub page2_button: String,
    /// `PAGE_3_BTN` — pagination control for page 3.
    pub page3_button: String,
}

impl Locators {
    /// Load locators from a property file. All keys are required.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let props = Properties::load(path)?;

        let locators = Self {
            search_input: props.required("SEARCH_ID")?.to_string(),
            results_sections: props.required("SEARCH_RESULTS")?.to_string(),
            result_items: props.required("SEARCH_ITEMS_RESULTS")?.to_string(),
            page2_button: props.required("PAGE_2_BTN")?.to_string(),
            page3_button: props.required("PAGE_3_BTN")?.to_string(),
        };

        info!("Loaded locators from {}", path.display());
        Ok(locators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_comments_blanks_and_separators() {
        let map = parse_properties(
            "# a comment\n\
             ! another comment\n\
             \n\
             testurl = https://example.org \n\
             wait_timeout_seconds:10\n\
             no_separator_line\n",
        );
        assert_eq!(map.get("testurl").unwrap(), "https://example.org");
        assert_eq!(map.get("wait_timeout_seconds").unwrap(), "10");
        assert!(!map.contains_key("no_separator_line"));
    }

    #[test]
    fn settings_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.properties",
            "testurl=https://example.org\n\
             wait_timeout_seconds=15\n\
             min_related_sections=3\n\
             browser=chrome\n\
             headless=true\n\
             screenshot_on_pass=true\n",
        );

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.testurl, "https://example.org");
        assert_eq!(settings.wait_timeout_seconds, 15);
        assert_eq!(settings.min_related_sections, 3);
        assert_eq!(settings.browser, BrowserKind::Chrome);
        assert!(settings.headless);
        assert!(settings.screenshot_on_pass);
        assert_eq!(settings.screenshot_dir, PathBuf::from("screenshots"));
        assert_eq!(settings.testdata_file, PathBuf::from("testdata/testdata.xlsx"));
    }

    #[test]
    fn settings_missing_key_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.properties",
            "testurl=https://example.org\nbrowser=chrome\nmin_related_sections=2\n",
        );

        match Settings::load(&path) {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, "wait_timeout_seconds"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn settings_invalid_int_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.properties",
            "testurl=u\nwait_timeout_seconds=soon\nmin_related_sections=1\nbrowser=chrome\n",
        );

        match Settings::load(&path) {
            Err(ConfigError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "wait_timeout_seconds");
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn settings_unsupported_browser_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.properties",
            "testurl=u\nwait_timeout_seconds=5\nmin_related_sections=1\nbrowser=netscape\n",
        );

        match Settings::load(&path) {
            Err(ConfigError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "browser");
                assert_eq!(value, "netscape");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_unavailable() {
        match Settings::load("config/definitely-not-here.properties") {
            Err(ConfigError::Unavailable { path, .. }) => {
                assert!(path.contains("definitely-not-here"))
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn locators_load_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "locators.properties",
            "SEARCH_ID=#search\n\
             SEARCH_RESULTS=section.results\n\
             SEARCH_ITEMS_RESULTS=li.item\n\
             PAGE_2_BTN=a[aria-label='Page 2']\n\
             PAGE_3_BTN=a[aria-label='Page 3']\n",
        );

        let loc = Locators::load(&path).unwrap();
        assert_eq!(loc.search_input, "#search");
        assert_eq!(loc.result_items, "li.item");
        assert_eq!(loc.page3_button, "a[aria-label='Page 3']");
    }

    #[test]
    fn locators_missing_key_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "locators.properties", "SEARCH_ID=#search\n");

        match Locators::load(&path) {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, "SEARCH_RESULTS"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }
}
