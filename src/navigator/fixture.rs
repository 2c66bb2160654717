//! In-memory navigation backend
//!
//! Serves a fixed set of pages keyed by address. Used by the test suites to
//! run whole crawls without a network, and to script transient failures.

use crate::navigator::{strip_elements, NavResult, NavigationError, Navigator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FixtureNavigator {
    pages: HashMap<String, String>,
    failures: HashMap<String, u32>,
    current: Option<(String, String)>,
    history: Vec<(String, String)>,
    visits: Vec<String>,
    closed: bool,
    close_count: usize,
}

/// Normalizes an address the way `url` serializes it, so "https://a.example"
/// and "https://a.example/" name the same page
fn page_key(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl FixtureNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(page_key(url), html.into());
        self
    }

    /// Makes the next `times` loads of `url` fail with status 503
    pub fn with_failures(mut self, url: &str, times: u32) -> Self {
        self.failures.insert(page_key(url), times);
        self
    }

    /// Every address loaded (navigate and reload), in order
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    /// How many loads hit `url`
    pub fn visit_count(&self, url: &str) -> usize {
        let key = page_key(url);
        self.visits.iter().filter(|v| **v == key).count()
    }

    pub fn close_count(&self) -> usize {
        self.close_count
    }

    fn load(&mut self, url: &str) -> NavResult<(String, String)> {
        if self.closed {
            return Err(NavigationError::SessionClosed);
        }
        let key = page_key(url);
        self.visits.push(key.clone());

        if let Some(remaining) = self.failures.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(NavigationError::Status {
                    url: key,
                    status: 503,
                });
            }
        }

        match self.pages.get(&key) {
            Some(html) => Ok((key, html.clone())),
            None => Err(NavigationError::Status {
                url: key,
                status: 404,
            }),
        }
    }

    fn strip(&mut self, selector: &str) -> usize {
        let Some((_, html)) = self.current.as_mut() else {
            return 0;
        };
        match strip_elements(html, selector) {
            Some((stripped, removed)) => {
                *html = stripped;
                removed
            }
            None => 0,
        }
    }
}

#[async_trait]
impl Navigator for FixtureNavigator {
    async fn navigate(&mut self, url: &str) -> NavResult<()> {
        let loaded = self.load(url)?;
        if let Some(previous) = self.current.replace(loaded) {
            self.history.push(previous);
        }
        Ok(())
    }

    async fn reload(&mut self) -> NavResult<()> {
        if self.closed {
            return Err(NavigationError::SessionClosed);
        }
        let url = self
            .current
            .as_ref()
            .map(|(url, _)| url.clone())
            .ok_or(NavigationError::NoPage)?;
        let loaded = self.load(&url)?;
        self.current = Some(loaded);
        Ok(())
    }

    async fn go_back(&mut self) -> NavResult<()> {
        if self.closed {
            return Err(NavigationError::SessionClosed);
        }
        let previous = self.history.pop().ok_or(NavigationError::NoHistory)?;
        self.current = Some(previous);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> bool {
        !self.closed && self.snapshot().contains(selector)
    }

    async fn dismiss(&mut self, selector: &str, _timeout: Duration) -> bool {
        !self.closed && self.strip(selector) > 0
    }

    async fn remove(&mut self, selector: &str) -> usize {
        if self.closed {
            return 0;
        }
        self.strip(selector)
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|(url, _)| url.as_str())
    }

    fn current_html(&self) -> String {
        self.current
            .as_ref()
            .map(|(_, html)| html.clone())
            .unwrap_or_default()
    }

    async fn close(&mut self) -> NavResult<()> {
        self.closed = true;
        self.close_count += 1;
        Ok(())
    }
}
