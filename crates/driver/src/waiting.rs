//! Explicit waits: bounded polling loops over page conditions
//!
//! Every wait re-evaluates its condition at a fixed interval until the
//! condition holds or the timeout elapses, then fails with a
//! [`DriverError::WaitTimeout`] naming the condition.

use crate::errors::{DriverError, Result};
use crate::session::PageHandle;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Default wait threshold, matching the suite-wide ten second cap.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout plus poll interval for one wait operation.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout, default poll interval.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Poll `condition` until it returns true or the timeout expires.
///
/// Boolean shorthand over [`wait_for_value`].
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    wait_for_value(
        || async { Ok(condition().await?.then_some(())) },
        config,
        description,
    )
    .await
}

/// Poll a producing condition until it yields a value. This is the one
/// poll/timeout loop; every other wait is built on it.
///
/// Conditions that error are treated as not-yet-satisfied: a poll racing a
/// navigation can transiently fail to evaluate, and the next poll decides.
pub async fn wait_for_value<T, F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();

    loop {
        match condition().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => {
                debug!(condition = description, error = %err, "wait poll errored, retrying");
            }
        }

        if start.elapsed() >= config.timeout {
            return Err(DriverError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

fn visibility_script(selector: &str) -> String {
    let escaped = PageHandle::selector_literal(selector);
    format!(
        "(() => {{\n    const el = document.querySelector({escaped});\n    if (!el) {{ return false; }}\n    const style = window.getComputedStyle(el);\n    if (style.display === 'none' || style.visibility === 'hidden') {{ return false; }}\n    const rect = el.getBoundingClientRect();\n    return rect.width > 0 && rect.height > 0;\n}})()"
    )
}

/// Wait until the element is present and rendered.
pub async fn wait_visible(page: &PageHandle, selector: &str, config: WaitConfig) -> Result<()> {
    let script = visibility_script(selector);
    wait_for(
        || page.eval_predicate(&script),
        config,
        &format!("selector '{selector}' visible"),
    )
    .await
}

/// Wait until the element is visible, enabled, and accepts pointer events.
pub async fn wait_clickable(page: &PageHandle, selector: &str, config: WaitConfig) -> Result<()> {
    let escaped = PageHandle::selector_literal(selector);
    let script = format!(
        "(() => {{\n    const el = document.querySelector({escaped});\n    if (!el) {{ return false; }}\n    if (el.disabled) {{ return false; }}\n    const style = window.getComputedStyle(el);\n    if (style.display === 'none' || style.visibility === 'hidden') {{ return false; }}\n    if (style.pointerEvents === 'none') {{ return false; }}\n    const rect = el.getBoundingClientRect();\n    return rect.width > 0 && rect.height > 0;\n}})()"
    );
    wait_for(
        || page.eval_predicate(&script),
        config,
        &format!("selector '{selector}' clickable"),
    )
    .await
}

/// Wait until the element is absent or no longer rendered.
pub async fn wait_hidden(page: &PageHandle, selector: &str, config: WaitConfig) -> Result<()> {
    let script = format!("!({})", visibility_script(selector));
    wait_for(
        || page.eval_predicate(&script),
        config,
        &format!("selector '{selector}' hidden"),
    )
    .await
}

/// Wait for Angular `$http` pending requests to drain.
///
/// A page that does not expose Angular has no pending `$http` requests, so
/// the predicate passes immediately there.
pub async fn wait_angular_ready(page: &PageHandle, config: WaitConfig) -> Result<()> {
    let script = "(() => {\n    if (typeof angular === 'undefined') { return true; }\n    try {\n        return angular.element(document).injector().get('$http').pendingRequests.length === 0;\n    } catch (err) {\n        return true;\n    }\n})()";
    wait_for(
        || page.eval_predicate(script),
        config,
        "angular pending requests drained",
    )
    .await
}

/// Wait until the element's trimmed text differs from `previous`.
pub async fn wait_text_changed(
    page: &PageHandle,
    selector: &str,
    previous: &str,
    config: WaitConfig,
) -> Result<()> {
    let escaped = PageHandle::selector_literal(selector);
    let previous_literal =
        serde_json::to_string(previous).map_err(|err| DriverError::Script(err.to_string()))?;
    let script = format!(
        "(() => {{\n    const el = document.querySelector({escaped});\n    if (!el) {{ return false; }}\n    return (el.textContent || '').trim() !== {previous_literal};\n}})()"
    );
    wait_for(
        || page.eval_predicate(&script),
        config,
        &format!("text of '{selector}' changed"),
    )
    .await
}
