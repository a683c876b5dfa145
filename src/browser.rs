//! Injectable browser environment.
//!
//! The authorization state machine needs three things from its host: the
//! current URL (to spot a pending callback), a way to rewrite the visible
//! URL without navigating (to strip authorization response parameters),
//! and a way to send the user to the authorization endpoint. Modeling
//! those as a trait keeps the state machine testable without a browser
//! and lets the CLI substitute the system browser plus a local callback
//! listener for `window.location`.

use crate::warning;

pub trait BrowserEnvironment {
    fn current_url(&self) -> String;
    fn replace_history(&mut self, url: &str);
    fn navigate(&mut self, url: &str);
}

/// Browser environment backed by the user's default system browser.
///
/// `navigate` opens the URL externally; the "current URL" is whatever the
/// local callback listener last captured and fed back through
/// [`set_current_url`](SystemBrowser::set_current_url).
#[derive(Debug, Default)]
pub struct SystemBrowser {
    current: String,
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the captured callback URL back into the environment, making
    /// it visible to the state machine as the current URL.
    pub fn set_current_url(&mut self, url: impl Into<String>) {
        self.current = url.into();
    }
}

impl BrowserEnvironment for SystemBrowser {
    fn current_url(&self) -> String {
        self.current.clone()
    }

    fn replace_history(&mut self, url: &str) {
        self.current = url.to_string();
    }

    fn navigate(&mut self, url: &str) {
        if webbrowser::open(url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                url
            )
        }
    }
}

/// Headless browser environment.
///
/// Holds a settable current URL and records navigations instead of
/// performing them. Used by tests and by non-interactive CLI commands
/// where an authorization redirect would be meaningless.
#[derive(Debug, Default)]
pub struct MemoryBrowser {
    current: String,
    navigations: Vec<String>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            current: url.into(),
            navigations: Vec::new(),
        }
    }

    pub fn set_current_url(&mut self, url: impl Into<String>) {
        self.current = url.into();
    }

    /// URLs passed to `navigate`, oldest first.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

impl BrowserEnvironment for MemoryBrowser {
    fn current_url(&self) -> String {
        self.current.clone()
    }

    fn replace_history(&mut self, url: &str) {
        self.current = url.to_string();
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}
