//! Storefront start-page UI test suite
//!
//! Drives a real Chromium-family browser over CDP to exercise the
//! storefront start page: search, login, add-to-cart. The reusable
//! automation layer (driver construction, page handles, explicit waits)
//! lives in the `storefront-driver` crate; this crate holds the suite
//! parameters, the page objects, and the integration tests under `tests/`.

pub mod config;
pub mod errors;
pub mod pages;

pub use config::SuiteParams;
pub use errors::{Result, SuiteError};
