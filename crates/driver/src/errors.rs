//! Error types for driver operations

use std::time::Duration;
use thiserror::Error;

/// Failure modes of browser construction and page interaction
#[derive(Debug, Error)]
pub enum DriverError {
    /// Configured browser name has no CDP-capable launcher
    #[error("unsupported browser: {0}")]
    UnsupportedBrowser(String),

    /// Browser process could not be started
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation attempted after the driver was closed
    #[error("driver is already closed")]
    AlreadyClosed,

    /// Navigation failed or did not settle before the page-load timeout
    #[error("navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Selector matched nothing
    #[error("element not found for selector '{selector}'")]
    ElementNotFound {
        selector: String,
        /// Present when the lookup failed in the transport rather than the
        /// DOM, e.g. a dropped CDP connection.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Explicit wait expired before its condition held
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout {
        condition: String,
        timeout: Duration,
    },

    /// JavaScript evaluation in the page context failed
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// Underlying CDP client error
    #[error("cdp error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// I/O error (executable discovery, temp directories)
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Timeouts and genuine element misses are the errors a caller may
    /// retry after changing the page state; a miss caused by a transport
    /// failure is terminal like the rest.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriverError::WaitTimeout { .. } | DriverError::ElementNotFound { source: None, .. }
        )
    }
}

/// Result alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeout_display_names_the_condition() {
        let err = DriverError::WaitTimeout {
            condition: "selector '.preloader' hidden".to_string(),
            timeout: Duration::from_secs(10),
        };
        let text = err.to_string();
        assert!(text.contains(".preloader"));
        assert!(text.contains("10s"));
    }

    #[test]
    fn retryable_classification() {
        assert!(DriverError::ElementNotFound {
            selector: "#signIn2".to_string(),
            source: None,
        }
        .is_retryable());
        assert!(!DriverError::AlreadyClosed.is_retryable());
        assert!(!DriverError::UnsupportedBrowser("firefox".to_string()).is_retryable());
    }

    #[test]
    fn element_lookup_failure_keeps_its_cause() {
        use std::error::Error as _;

        let err = DriverError::ElementNotFound {
            selector: "#signIn2".to_string(),
            source: Some(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "websocket closed",
            ))),
        };

        // The cause stays on the error chain instead of being flattened
        // into a plain "not found".
        assert!(err.source().is_some());
        assert!(err.source().unwrap().to_string().contains("websocket closed"));
        assert!(err.to_string().contains("#signIn2"));
        assert!(!err.is_retryable());
    }
}
