//! Driver construction: browser selection and launch configuration
//!
//! Maps a browser-name configuration value onto a CDP-capable launch,
//! applies the page-load timeout, and sizes the window. Only Chromium-family
//! browsers can be driven over CDP; anything else is rejected up front.

use crate::errors::{DriverError, Result};
use chromiumoxide::browser::BrowserConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Default page-load / script deadline when configuration does not set one.
pub const DEFAULT_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser families the driver can launch.
///
/// Opera is Chromium-based and launches through the Chrome binary set, the
/// same mapping the classic WebDriver factories use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Chromium,
    Edge,
    Opera,
}

impl BrowserKind {
    /// Executable names probed on PATH, in preference order.
    fn executable_candidates(self) -> &'static [&'static str] {
        match self {
            BrowserKind::Chrome | BrowserKind::Opera => {
                &["google-chrome", "google-chrome-stable", "chrome"]
            }
            BrowserKind::Chromium => &["chromium", "chromium-browser"],
            BrowserKind::Edge => &["microsoft-edge", "microsoft-edge-stable", "msedge"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Chromium => "chromium",
            BrowserKind::Edge => "edge",
            BrowserKind::Opera => "opera",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = DriverError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "chromium" => Ok(BrowserKind::Chromium),
            "edge" => Ok(BrowserKind::Edge),
            "opera" => Ok(BrowserKind::Opera),
            other => Err(DriverError::UnsupportedBrowser(other.to_string())),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Launch configuration for a [`crate::Driver`].
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Browser family to launch.
    pub kind: BrowserKind,

    /// Explicit executable path; overrides PATH discovery.
    pub executable: Option<PathBuf>,

    /// Headless mode (default: true).
    pub headless: bool,

    /// Window size used when headless; headed windows start maximized.
    pub window_size: (u32, u32),

    /// Deadline for navigation settling and script-backed waits.
    pub page_load_timeout: Duration,

    /// Additional browser arguments.
    pub args: Vec<String>,
}

impl DriverConfig {
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Headed mode, for watching a run locally.
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// Resolve the browser executable: explicit override first, then PATH.
    ///
    /// Returning `None` defers to the CDP client's own detection, which
    /// finds a default Chromium install on most systems.
    pub(crate) fn resolve_executable(&self) -> Option<PathBuf> {
        if let Some(path) = &self.executable {
            return Some(path.clone());
        }

        for candidate in self.kind.executable_candidates() {
            if let Ok(path) = which::which(candidate) {
                debug!(browser = %self.kind, path = %path.display(), "resolved browser executable");
                return Some(path);
            }
        }

        warn!(
            browser = %self.kind,
            "no executable found on PATH, deferring to client auto-detection"
        );
        None
    }

    /// Build the chromiumoxide launch configuration.
    pub(crate) fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        if self.headless {
            builder = builder.arg("--headless");
            builder = builder.arg(format!(
                "--window-size={},{}",
                self.window_size.0, self.window_size.1
            ));
        } else {
            builder = builder.with_head();
            builder = builder.arg("--start-maximized");
        }

        // Unique profile directory so parallel launches never fight over
        // Chromium's ProcessSingleton lock.
        let user_data_dir = std::env::temp_dir().join(format!(
            "storefront-driver-{}",
            uuid::Uuid::new_v4()
        ));
        builder = builder.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            builder = builder.arg(arg.clone());
        }

        if let Some(path) = self.resolve_executable() {
            builder = builder.chrome_executable(path);
        }

        builder = builder.request_timeout(self.page_load_timeout);

        builder.build().map_err(|err| DriverError::LaunchFailed {
            reason: format!("invalid browser configuration: {err}"),
            source: None,
        })
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            executable: None,
            headless: true,
            window_size: (1920, 1080),
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT,
            args: vec![
                // Required in containers where user namespaces are
                // unavailable; never point this at untrusted pages outside
                // an isolated test environment.
                "--no-sandbox".to_string(),
                // Avoids /dev/shm exhaustion in containerized CI.
                "--disable-dev-shm-usage".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_kind_parses_case_insensitively() {
        assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!(
            " chromium ".parse::<BrowserKind>().unwrap(),
            BrowserKind::Chromium
        );
        assert_eq!("EDGE".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        assert_eq!("opera".parse::<BrowserKind>().unwrap(), BrowserKind::Opera);
    }

    #[test]
    fn firefox_is_rejected() {
        match "firefox".parse::<BrowserKind>() {
            Err(DriverError::UnsupportedBrowser(name)) => assert_eq!(name, "firefox"),
            other => panic!("expected UnsupportedBrowser, got {other:?}"),
        }
    }

    #[test]
    fn explicit_executable_wins_over_discovery() {
        let config = DriverConfig::new(BrowserKind::Chrome)
            .with_executable("/opt/chrome/chrome");
        assert_eq!(
            config.resolve_executable(),
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }

    #[test]
    fn default_config_is_headless_with_sandbox_disabled() {
        let config = DriverConfig::default();
        assert!(config.headless);
        assert!(config.args.iter().any(|a| a == "--no-sandbox"));
        assert_eq!(config.page_load_timeout, DEFAULT_PAGE_LOAD_TIMEOUT);
    }

    #[test]
    fn opera_launches_through_the_chrome_binary_set() {
        assert_eq!(
            BrowserKind::Opera.executable_candidates(),
            BrowserKind::Chrome.executable_candidates()
        );
    }
}
