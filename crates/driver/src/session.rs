//! Browser lifecycle and page interaction
//!
//! [`Driver`] owns a launched browser process plus the task that drives its
//! CDP event loop. [`PageHandle`] is one controlled tab: navigation, script
//! evaluation, and the element interactions the page objects are built from.
//!
//! The driver implements Drop through the underlying client, so a panicking
//! test still tears the browser process down; explicit [`Driver::close`] is
//! preferred for graceful shutdown.

use crate::errors::{DriverError, Result};
use crate::factory::DriverConfig;
use crate::waiting::{self, WaitConfig};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// A launched browser instance.
pub struct Driver {
    inner: Arc<Mutex<Option<Browser>>>,
    page_load_timeout: Duration,
}

impl Driver {
    /// Launch a browser per `config` and start its CDP handler loop.
    pub async fn launch(config: DriverConfig) -> Result<Self> {
        info!(
            browser = %config.kind,
            headless = config.headless,
            timeout_ms = config.page_load_timeout.as_millis() as u64,
            "launching browser"
        );

        let page_load_timeout = config.page_load_timeout;
        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|err| DriverError::LaunchFailed {
                    reason: "failed to start browser process".to_string(),
                    source: Some(Box::new(err)),
                })?;

        // The handler stream must be pumped for any CDP traffic to flow.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "browser handler error");
                }
            }
            debug!("browser handler loop finished");
        });

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            page_load_timeout,
        })
    }

    /// Open a new tab.
    pub async fn new_page(&self) -> Result<PageHandle> {
        let guard = self.inner.lock().await;
        let browser = guard.as_ref().ok_or(DriverError::AlreadyClosed)?;

        let page = browser.new_page("about:blank").await?;

        Ok(PageHandle {
            inner: Arc::new(page),
            page_load_timeout: self.page_load_timeout,
        })
    }

    /// Deadline applied to navigation settling and script-backed waits.
    pub fn page_load_timeout(&self) -> Duration {
        self.page_load_timeout
    }

    /// Close the browser and end the process.
    pub async fn close(self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        if let Some(mut browser) = guard.take() {
            debug!("closing browser");
            browser.close().await?;
        }
        Ok(())
    }

    /// True once [`Driver::close`] has run.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

/// One controlled browser tab.
#[derive(Clone)]
pub struct PageHandle {
    inner: Arc<CdpPage>,
    page_load_timeout: Duration,
}

impl PageHandle {
    /// JSON-encode a selector for safe embedding in a script.
    ///
    /// Encoding through JSON neutralizes backticks, quotes, and newlines, so
    /// selectors can never break out of the querySelector argument.
    pub(crate) fn selector_literal(selector: &str) -> String {
        serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
    }

    /// Navigate and wait for `document.readyState === "complete"` within the
    /// page-load timeout.
    pub async fn goto(&self, url: &str) -> Result<()> {
        Url::parse(url).map_err(|err| DriverError::Navigation {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        debug!(url, "navigating");
        self.inner
            .goto(url)
            .await
            .map_err(|err| DriverError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        self.wait_for_load().await
    }

    /// Wait for the document to finish loading.
    ///
    /// `goto` calls this automatically; call it manually after triggering a
    /// navigation from script.
    pub async fn wait_for_load(&self) -> Result<()> {
        waiting::wait_for(
            || async {
                let state: String = self.evaluate("document.readyState").await?;
                Ok(state == "complete")
            },
            WaitConfig::with_timeout(self.page_load_timeout),
            "document ready",
        )
        .await
    }

    /// Evaluate a script in the page context and deserialize its value.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|err| DriverError::Script(err.to_string()))?;

        result
            .into_value()
            .map_err(|err| DriverError::Script(err.to_string()))
    }

    /// Evaluate a boolean predicate; a non-boolean result counts as false.
    pub async fn eval_predicate(&self, script: &str) -> Result<bool> {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|err| DriverError::Script(err.to_string()))?;

        Ok(result
            .value()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    /// Trimmed text content of the first element matching `selector`.
    pub async fn text_of(&self, selector: &str) -> Result<String> {
        let escaped = Self::selector_literal(selector);
        let script = format!(
            "(() => {{\n    const el = document.querySelector({escaped});\n    return el ? (el.textContent || '').trim() : null;\n}})()"
        );
        let text: Option<String> = self.evaluate(&script).await?;
        text.ok_or_else(|| DriverError::ElementNotFound {
            selector: selector.to_string(),
            source: None,
        })
    }

    /// Find the first element matching `selector`, keeping the lookup
    /// failure on the error chain so a dropped connection is not mistaken
    /// for a missing element.
    async fn find(&self, selector: &str) -> Result<chromiumoxide::element::Element> {
        self.inner
            .find_element(selector)
            .await
            .map_err(|err| DriverError::ElementNotFound {
                selector: selector.to_string(),
                source: Some(Box::new(err)),
            })
    }

    /// Click the first element matching `selector`.
    pub async fn click(&self, selector: &str) -> Result<()> {
        debug!(selector, "click");
        let element = self.find(selector).await?;
        element.click().await?;
        Ok(())
    }

    /// Focus the first element matching `selector` and type `text` into it.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        debug!(selector, chars = text.len(), "type text");
        let element = self.find(selector).await?;
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    /// Press Enter on the first element matching `selector`.
    pub async fn press_enter(&self, selector: &str) -> Result<()> {
        debug!(selector, "press enter");
        let element = self.find(selector).await?;
        element.press_key("Enter").await?;
        Ok(())
    }

    /// Empty an input's value, firing an `input` event so listeners notice.
    pub async fn clear(&self, selector: &str) -> Result<()> {
        let escaped = Self::selector_literal(selector);
        let script = format!(
            "(() => {{\n    const el = document.querySelector({escaped});\n    if (!el) {{ return false; }}\n    el.value = '';\n    el.dispatchEvent(new Event('input', {{ bubbles: true }}));\n    return true;\n}})()"
        );
        if self.eval_predicate(&script).await? {
            Ok(())
        } else {
            Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
                source: None,
            })
        }
    }

    /// True when `selector` matches a rendered, displayed element.
    pub async fn is_displayed(&self, selector: &str) -> Result<bool> {
        let escaped = Self::selector_literal(selector);
        let script = format!(
            "(() => {{\n    const el = document.querySelector({escaped});\n    if (!el) {{ return false; }}\n    const style = window.getComputedStyle(el);\n    if (style.display === 'none' || style.visibility === 'hidden') {{ return false; }}\n    const rect = el.getBoundingClientRect();\n    return rect.width > 0 && rect.height > 0;\n}})()"
        );
        self.eval_predicate(&script).await
    }

    /// Halt in-flight loads, the `window.stop()` the original flow leans on
    /// for heavy pages.
    pub async fn stop_loading(&self) -> Result<()> {
        self.inner
            .evaluate("window.stop();")
            .await
            .map_err(|err| DriverError::Script(err.to_string()))?;
        Ok(())
    }

    /// Current document title.
    pub async fn title(&self) -> Result<String> {
        let title = self
            .inner
            .get_title()
            .await
            .map_err(|err| DriverError::Script(err.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    /// Current location href.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Deadline inherited from the driver configuration.
    pub fn page_load_timeout(&self) -> Duration {
        self.page_load_timeout
    }
}
