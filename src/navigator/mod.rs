//! Navigation capability used by the crawl engine
//!
//! The crawl never talks to a rendering technology directly. It drives a
//! [`Navigator`], which loads addresses, exposes the current document, and
//! handles interstitials. Two backends ship with the crate:
//! - [`HttpNavigator`]: fetches pages with reqwest and parses them with scraper
//! - [`FixtureNavigator`]: serves an in-memory directory, for tests and dry runs

mod fixture;
mod http;
mod page;

pub use fixture::FixtureNavigator;
pub use http::{build_http_client, HttpNavigator};
pub use page::{resolve_link, Element, Page};

pub(crate) use page::strip_elements;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a navigation backend
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("No page has been loaded")]
    NoPage,

    #[error("No earlier page in history")]
    NoHistory,

    #[error("Navigation session is closed")]
    SessionClosed,
}

impl NavigationError {
    /// Returns true if the session itself is gone and no retry can help
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionClosed)
    }
}

/// Result type for navigation operations
pub type NavResult<T> = Result<T, NavigationError>;

/// A single browsing session
///
/// One navigation happens at a time; callers hold `&mut` for every load.
/// Query methods read the current document and never fail: a missing page
/// simply has no elements.
#[async_trait]
pub trait Navigator: Send {
    /// Loads an address and makes it the current page
    async fn navigate(&mut self, url: &str) -> NavResult<()>;

    /// Loads the current address again
    async fn reload(&mut self) -> NavResult<()>;

    /// Returns to the previously loaded page
    async fn go_back(&mut self) -> NavResult<()>;

    /// Waits up to `timeout` for an element matching `selector`
    ///
    /// Returns false on timeout; the caller decides whether that matters.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> bool;

    /// Accepts or rejects a consent-style dialog by activating its control
    ///
    /// Returns true if a matching control appeared within `timeout`.
    async fn dismiss(&mut self, selector: &str, timeout: Duration) -> bool;

    /// Removes overlay elements from the current page, returning how many
    async fn remove(&mut self, selector: &str) -> usize;

    /// Address of the current page, if any
    fn current_url(&self) -> Option<&str>;

    /// Source of the current page (empty when nothing is loaded)
    fn current_html(&self) -> String;

    /// Releases the session; every later load fails with `SessionClosed`
    async fn close(&mut self) -> NavResult<()>;

    /// Parses the current page
    fn snapshot(&self) -> Page {
        Page::parse(self.current_html(), self.current_url())
    }

    fn find(&self, selector: &str) -> Option<Element> {
        self.snapshot().find(selector)
    }

    fn find_all(&self, selector: &str) -> Vec<Element> {
        self.snapshot().find_all(selector)
    }

    /// `(text, absolute href)` pairs for the matching link elements
    fn current_references(&self, selector: &str) -> Vec<(String, String)> {
        self.snapshot().references(selector)
    }

    /// Visible text of the current page
    fn current_text(&self) -> String {
        self.snapshot().text()
    }
}
