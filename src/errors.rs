//! Suite-level error type

use storefront_driver::DriverError;
use thiserror::Error;

/// Errors surfaced by parameter loading and page-object actions
#[derive(Debug, Error)]
pub enum SuiteError {
    /// Parameter file or environment override could not be read
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A parameter was present but unusable
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Driver or page interaction failure
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The cart counter did not hold a number
    #[error("cart counter text is not numeric: '{text}'")]
    CounterNotNumeric { text: String },
}

/// Result alias for suite operations
pub type Result<T> = std::result::Result<T, SuiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_pass_through_transparently() {
        let err: SuiteError = DriverError::AlreadyClosed.into();
        assert_eq!(err.to_string(), DriverError::AlreadyClosed.to_string());
    }

    #[test]
    fn invalid_parameter_names_the_key() {
        let err = SuiteError::InvalidParameter {
            name: "web_url".to_string(),
            reason: "must not be empty".to_string(),
        };
        assert!(err.to_string().contains("web_url"));
    }
}
