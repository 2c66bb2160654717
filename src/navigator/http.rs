//! HTTP navigation backend
//!
//! This module drives a browsing session over plain HTTP:
//! - Building the reqwest client with the session's user agent and cookie jar
//! - GET requests with status classification
//! - A one-page history so `go_back` returns to the listing without refetching
//!
//! Documents are static once fetched. Nothing runs scripts, so readiness is a
//! presence check and dismissing a dialog removes its control from the copy
//! held in memory.

use crate::config::Config;
use crate::navigator::{strip_elements, NavResult, NavigationError, Navigator, Page};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client for one session
///
/// # Arguments
///
/// * `user_agent` - User-agent header sent with every request
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

#[derive(Debug, Clone)]
struct Loaded {
    url: String,
    html: String,
}

/// Navigator fetching pages with reqwest
pub struct HttpNavigator {
    client: Client,
    current: Option<Loaded>,
    /// Page shown before the current one; only a single step back is kept
    previous: Option<Loaded>,
    closed: bool,
}

impl HttpNavigator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
            previous: None,
            closed: false,
        }
    }

    /// Opens a session for a directory profile, picking its user agent
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let user_agent = config.user_agent.choose();
        tracing::debug!("Session user agent: {}", user_agent);
        let client = build_http_client(user_agent, config.crawler.request_timeout())?;
        Ok(Self::new(client))
    }

    async fn fetch(&self, url: &str) -> NavResult<Loaded> {
        if self.closed {
            return Err(NavigationError::SessionClosed);
        }
        url::Url::parse(url).map_err(|e| NavigationError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| NavigationError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Final URL after redirects
        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|source| NavigationError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, html.len());
        Ok(Loaded {
            url: final_url,
            html,
        })
    }

    fn page(&self) -> Option<Page> {
        if self.closed {
            return None;
        }
        self.current
            .as_ref()
            .map(|loaded| Page::parse(loaded.html.as_str(), Some(loaded.url.as_str())))
    }

    fn strip(&mut self, selector: &str) -> usize {
        let Some(current) = self.current.as_mut() else {
            return 0;
        };
        match strip_elements(&current.html, selector) {
            Some((html, removed)) => {
                current.html = html;
                removed
            }
            None => 0,
        }
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&mut self, url: &str) -> NavResult<()> {
        let loaded = self.fetch(url).await?;
        if let Some(previous) = self.current.replace(loaded) {
            self.previous = Some(previous);
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
            .map(|c| c.url.clone())
            .ok_or(NavigationError::NoPage)?;
        let loaded = self.fetch(&url).await?;
        self.current = Some(loaded);
        Ok(())
    }

    async fn go_back(&mut self) -> NavResult<()> {
        if self.closed {
            return Err(NavigationError::SessionClosed);
        }
        let previous = self.previous.take().ok_or(NavigationError::NoHistory)?;
        self.current = Some(previous);
        Ok(())
    }

    /// A fetched document never changes, so presence is checked once
    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> bool {
        self.page().is_some_and(|page| page.contains(selector))
    }

    async fn dismiss(&mut self, selector: &str, _timeout: Duration) -> bool {
        if self.closed {
            return false;
        }
        self.strip(selector) > 0
    }

    async fn remove(&mut self, selector: &str) -> usize {
        if self.closed {
            return 0;
        }
        self.strip(selector)
    }

    fn current_url(&self) -> Option<&str> {
        if self.closed {
            return None;
        }
        self.current.as_ref().map(|c| c.url.as_str())
    }

    fn current_html(&self) -> String {
        if self.closed {
            return String::new();
        }
        self.current
            .as_ref()
            .map(|c| c.html.clone())
            .unwrap_or_default()
    }

    async fn close(&mut self) -> NavResult<()> {
        self.closed = true;
        self.current = None;
        self.previous = None;
        Ok(())
    }
}
