//! Suite parameters
//!
//! Parameters are layered: built-in defaults, then the YAML file (by default
//! `config/default.yaml`, overridable through `E2E_CONFIG`), then `E2E_*`
//! environment variables. Missing files are fine; unusable values are typed
//! errors at load time rather than surprises mid-test.

use crate::errors::{Result, SuiteError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storefront_driver::{BrowserKind, DriverConfig};
use url::Url;

/// Environment variable naming the parameter file.
pub const CONFIG_PATH_VAR: &str = "E2E_CONFIG";

/// Default parameter file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Everything the suite reads at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteParams {
    /// Browser family name, parsed to [`BrowserKind`].
    pub browser: String,

    /// Storefront start page URL.
    pub web_url: String,

    /// Page-load and script deadline, seconds.
    pub page_load_timeout_secs: u64,

    /// Explicit browser executable, overriding PATH discovery.
    #[serde(default)]
    pub driver_path: Option<PathBuf>,

    /// Headless launch; turn off to watch a run.
    pub headless: bool,

    /// Credentials for the wrong-login test; intentionally invalid.
    pub login: String,
    pub password: String,

    /// Query used by the search and cart tests.
    pub search_query: String,

    /// Error text the login form shows for bad credentials.
    pub login_error_message: String,

    /// Suffix the search banner ends with on a successful search.
    pub search_result_marker: String,
}

impl SuiteParams {
    /// Load from the default location (or `E2E_CONFIG`), then apply
    /// environment overrides, then validate.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Load from an explicit file path. A missing file falls back to the
    /// built-in defaults plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Self::builder_with_defaults()?
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("E2E"))
            .build()?;

        let params: SuiteParams = settings.try_deserialize()?;
        params.validate()?;
        Ok(params)
    }

    fn builder_with_defaults(
    ) -> std::result::Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("browser", "chrome")?
            .set_default("web_url", "")?
            .set_default("page_load_timeout_secs", 30i64)?
            .set_default("headless", true)?
            .set_default("login", "")?
            .set_default("password", "")?
            .set_default("search_query", "")?
            .set_default("login_error_message", "")?
            .set_default("search_result_marker", "НАЙДЕНО:")
    }

    fn validate(&self) -> Result<()> {
        self.browser
            .parse::<BrowserKind>()
            .map_err(|err| SuiteError::InvalidParameter {
                name: "browser".to_string(),
                reason: err.to_string(),
            })?;

        if self.web_url.is_empty() {
            return Err(SuiteError::InvalidParameter {
                name: "web_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Url::parse(&self.web_url).map_err(|err| SuiteError::InvalidParameter {
            name: "web_url".to_string(),
            reason: err.to_string(),
        })?;

        if self.page_load_timeout_secs == 0 {
            return Err(SuiteError::InvalidParameter {
                name: "page_load_timeout_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Parsed browser kind. `validate` has already vouched for it, but the
    /// accessor still propagates instead of panicking.
    pub fn browser_kind(&self) -> Result<BrowserKind> {
        Ok(self.browser.parse::<BrowserKind>()?)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Launch configuration derived from these parameters.
    pub fn driver_config(&self) -> Result<DriverConfig> {
        let mut config = DriverConfig::new(self.browser_kind()?)
            .with_page_load_timeout(self.page_load_timeout());

        if !self.headless {
            config = config.visible();
        }
        if let Some(path) = &self.driver_path {
            config = config.with_executable(path);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    // Every test here is serialized: the loader reads E2E_* variables, and
    // environment mutation is process-global.

    fn write_params_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("params.yaml");
        let mut file = std::fs::File::create(&path).expect("create params file");
        file.write_all(contents.as_bytes()).expect("write params");
        path
    }

    const FULL_PARAMS: &str = r#"
browser: chromium
web_url: "https://shop.example.com/"
page_load_timeout_secs: 15
headless: true
login: "qa-wrong-login"
password: "qa-wrong-password"
search_query: "notebook"
login_error_message: "Wrong login or password."
search_result_marker: "FOUND:"
"#;

    #[test]
    #[serial]
    fn loads_parameters_from_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(&dir, FULL_PARAMS);

        let params = SuiteParams::load_from(&path).expect("load params");
        assert_eq!(params.browser_kind().unwrap(), BrowserKind::Chromium);
        assert_eq!(params.web_url, "https://shop.example.com/");
        assert_eq!(params.page_load_timeout(), Duration::from_secs(15));
        assert_eq!(params.driver_path, None);
        assert_eq!(params.search_result_marker, "FOUND:");
    }

    #[test]
    #[serial]
    fn missing_web_url_is_a_typed_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(&dir, "browser: chrome\n");

        match SuiteParams::load_from(&path) {
            Err(SuiteError::InvalidParameter { name, .. }) => assert_eq!(name, "web_url"),
            other => panic!("expected InvalidParameter, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    #[serial]
    fn unsupported_browser_is_rejected_at_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(
            &dir,
            "browser: firefox\nweb_url: \"https://shop.example.com/\"\n",
        );

        match SuiteParams::load_from(&path) {
            Err(SuiteError::InvalidParameter { name, reason }) => {
                assert_eq!(name, "browser");
                assert!(reason.contains("firefox"));
            }
            other => panic!("expected InvalidParameter, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    #[serial]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(
            &dir,
            "web_url: \"https://shop.example.com/\"\npage_load_timeout_secs: 0\n",
        );

        match SuiteParams::load_from(&path) {
            Err(SuiteError::InvalidParameter { name, .. }) => {
                assert_eq!(name, "page_load_timeout_secs")
            }
            other => panic!("expected InvalidParameter, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    #[serial]
    fn driver_config_carries_timeout_and_executable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(
            &dir,
            r#"
browser: edge
web_url: "https://shop.example.com/"
page_load_timeout_secs: 20
driver_path: "/opt/edge/msedge"
headless: false
"#,
        );

        let params = SuiteParams::load_from(&path).expect("load params");
        let config = params.driver_config().expect("driver config");
        assert_eq!(config.kind, BrowserKind::Edge);
        assert_eq!(config.page_load_timeout, Duration::from_secs(20));
        assert_eq!(config.executable, Some(PathBuf::from("/opt/edge/msedge")));
        assert!(!config.headless);
    }

    #[test]
    #[serial]
    fn environment_overrides_win_over_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(&dir, FULL_PARAMS);

        std::env::set_var("E2E_BROWSER", "opera");
        std::env::set_var("E2E_SEARCH_QUERY", "tablet");
        let result = SuiteParams::load_from(&path);
        std::env::remove_var("E2E_BROWSER");
        std::env::remove_var("E2E_SEARCH_QUERY");

        let params = result.expect("load params");
        assert_eq!(params.browser_kind().unwrap(), BrowserKind::Opera);
        assert_eq!(params.search_query, "tablet");
        // Keys without an override keep their file values.
        assert_eq!(params.web_url, "https://shop.example.com/");
        assert_eq!(params.search_result_marker, "FOUND:");
    }

    #[test]
    #[serial]
    fn config_path_variable_redirects_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_params_file(&dir, FULL_PARAMS);

        std::env::set_var(CONFIG_PATH_VAR, &path);
        let result = SuiteParams::load();
        std::env::remove_var(CONFIG_PATH_VAR);

        let params = result.expect("load params");
        assert_eq!(params.web_url, "https://shop.example.com/");
        assert_eq!(params.page_load_timeout(), Duration::from_secs(15));
    }
}
