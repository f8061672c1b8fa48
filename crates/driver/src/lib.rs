//! Chromium-backed browser driver for storefront UI tests
//!
//! Three pieces:
//! - `factory`: browser selection and launch configuration
//! - `session`: the launched browser and its page handles
//! - `waiting`: explicit waits over page conditions

pub mod errors;
pub mod factory;
pub mod session;
pub mod waiting;

pub use errors::{DriverError, Result};
pub use factory::{BrowserKind, DriverConfig, DEFAULT_PAGE_LOAD_TIMEOUT};
pub use session::{Driver, PageHandle};
pub use waiting::{WaitConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
