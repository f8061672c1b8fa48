//! Start page object
//!
//! Models the storefront start page as a set of locators and high-level
//! actions. Every action is a wait-then-act sequence: the element condition
//! is polled first, then the interaction is dispatched, then the page is
//! given a chance to settle before anything is read back.

use crate::errors::{Result, SuiteError};
use std::time::Duration;
use storefront_driver::{waiting, PageHandle, WaitConfig};
use tracing::{debug, info};

/// Wait threshold applied to every element condition on this page.
const MAX_WAIT: Duration = Duration::from_secs(10);

/// Search input field.
const SEARCH_INPUT: &str = ".input-search";

/// Authorization form window.
const LOGIN_BOX: &str = ".login-box.logout-box";

/// Login field inside the authorization form.
const LOGIN_FIELD: &str = "input[name = 'login']";

/// Password field inside the authorization form.
const PASSWORD_FIELD: &str = "input[name = 'password']";

/// Preloader overlay; interactions wait out its invisibility.
const PRELOADER: &str = ".preloader";

/// Login error message text.
const LOGIN_ERROR_MESSAGE: &str = ".login-error";

/// Cart counter.
const CART_COUNTER: &str = "#itogCount";

/// Button that shows the authorization form.
const AUTH_BUTTON: &str = ".authorization.login-button";

/// Sign-in button inside the authorization form.
const LOGIN_BUTTON: &str = "#signIn2";

/// Search results banner.
const SEARCH_RESULT: &str = ".search-word";

/// Add-to-cart button in the first search result.
const ADD_TO_CART_BUTTON: &str =
    ".search-block-name>.search-block>ul>li:nth-child(1)>div>.add-to-cart.buy";

/// The storefront start page.
pub struct StartPage {
    page: PageHandle,
    wait: WaitConfig,
}

impl StartPage {
    pub fn new(page: PageHandle) -> Self {
        Self {
            page,
            wait: WaitConfig::with_timeout(MAX_WAIT),
        }
    }

    /// Underlying page handle, for assertions that bypass the page object.
    pub fn page(&self) -> &PageHandle {
        &self.page
    }

    /// Show the authorization form.
    ///
    /// Waits for the button to become clickable and the preloader to clear
    /// before clicking, then halts whatever the page is still loading.
    pub async fn open_auth_form(&self) -> Result<()> {
        info!("opening authorization form");

        waiting::wait_clickable(&self.page, AUTH_BUTTON, self.wait).await?;
        waiting::wait_hidden(&self.page, PRELOADER, self.wait).await?;
        self.page.click(AUTH_BUTTON).await?;
        self.page.stop_loading().await?;

        Ok(())
    }

    /// Try to authorize and return the error message the form shows.
    ///
    /// The suite only ever submits invalid credentials, so the error banner
    /// is the expected terminal state.
    pub async fn submit_login(&self, login: &str, password: &str) -> Result<String> {
        info!(login, "submitting login form");

        self.open_auth_form().await?;
        self.page.stop_loading().await?;
        waiting::wait_visible(&self.page, LOGIN_BOX, self.wait).await?;

        self.page.type_text(LOGIN_FIELD, login).await?;
        self.page.stop_loading().await?;
        self.page.type_text(PASSWORD_FIELD, password).await?;
        self.page.stop_loading().await?;

        // The preloader can reappear between filling and submitting.
        if self.page.is_displayed(PRELOADER).await? {
            waiting::wait_hidden(&self.page, PRELOADER, self.wait).await?;
        }
        self.page.click(LOGIN_BUTTON).await?;

        waiting::wait_visible(&self.page, LOGIN_ERROR_MESSAGE, self.wait).await?;
        let message = self.page.text_of(LOGIN_ERROR_MESSAGE).await?;

        debug!(message = %message, "login form reported an error");
        Ok(message)
    }

    /// Run a search and wait for the results banner.
    pub async fn search(&self, query: &str) -> Result<()> {
        info!(query, "searching");

        self.page.clear(SEARCH_INPUT).await?;
        self.page.type_text(SEARCH_INPUT, query).await?;
        self.page.press_enter(SEARCH_INPUT).await?;
        waiting::wait_visible(&self.page, SEARCH_RESULT, self.wait).await?;

        Ok(())
    }

    /// Run a search and return the results banner text.
    pub async fn search_result_text(&self, query: &str) -> Result<String> {
        self.search(query).await?;
        let text = self.page.text_of(SEARCH_RESULT).await?;
        debug!(text = %text, "search banner");
        Ok(text)
    }

    /// Search for `query` and add its first result to the cart.
    ///
    /// Completes once the cart counter text has moved off its snapshot, the
    /// page's only observable confirmation of the add.
    pub async fn add_first_result_to_cart(&self, query: &str) -> Result<()> {
        info!(query, "adding first search result to cart");

        self.search(query).await?;
        self.page.stop_loading().await?;

        let counter_before = self.page.text_of(CART_COUNTER).await?;
        waiting::wait_clickable(&self.page, ADD_TO_CART_BUTTON, self.wait).await?;
        self.page.click(ADD_TO_CART_BUTTON).await?;

        waiting::wait_text_changed(&self.page, CART_COUNTER, &counter_before, self.wait).await?;
        Ok(())
    }

    /// Current cart counter value.
    pub async fn cart_count(&self) -> Result<u32> {
        let text = self.page.text_of(CART_COUNTER).await?;
        parse_cart_count(&text)
    }

    /// Current page title.
    pub async fn title(&self) -> Result<String> {
        Ok(self.page.title().await?)
    }
}

fn parse_cart_count(text: &str) -> Result<u32> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| SuiteError::CounterNotNumeric {
            text: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_count_parses_plain_numbers() {
        assert_eq!(parse_cart_count("0").unwrap(), 0);
        assert_eq!(parse_cart_count(" 12 ").unwrap(), 12);
    }

    #[test]
    fn cart_count_rejects_non_numeric_text() {
        match parse_cart_count("корзина") {
            Err(SuiteError::CounterNotNumeric { text }) => assert_eq!(text, "корзина"),
            other => panic!("expected CounterNotNumeric, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn locators_match_the_storefront_markup() {
        // The add-to-cart locator is the one most likely to drift; pin it.
        assert!(ADD_TO_CART_BUTTON.contains("li:nth-child(1)"));
        assert!(ADD_TO_CART_BUTTON.ends_with(".add-to-cart.buy"));
        assert_eq!(CART_COUNTER, "#itogCount");
    }
}
