//! Detail visitor
//!
//! Turns one item reference into a record: load the detail page, clear
//! interstitials, wait for the page to render, then run every field's
//! strategy chain against a snapshot.

use crate::config::{Config, CrawlerConfig, InterstitialConfig};
use crate::crawler::interstitial::clear_interstitials;
use crate::crawler::pacing::pause;
use crate::extract::FieldExtractor;
use crate::navigator::Navigator;
use crate::record::{ItemReference, Record};
use crate::{ConfigError, CrawlError};

pub struct DetailVisitor {
    extractor: FieldExtractor,
    ready_selector: Option<String>,
    interstitials: InterstitialConfig,
    crawler: CrawlerConfig,
}

impl DetailVisitor {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            extractor: FieldExtractor::new(&config.fields)?,
            ready_selector: config.detail.ready_selector.clone(),
            interstitials: config.interstitials.clone(),
            crawler: config.crawler.clone(),
        })
    }

    /// Visits one detail page and extracts its record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - Page loaded; fields that could not be read are `NotFound`
    /// * `Ok(None)` - Page failed to load after every retry
    /// * `Err(CrawlError::SessionLost)` - The navigation session is gone
    ///
    /// The session is left on the detail page.
    pub async fn visit<N: Navigator + ?Sized>(
        &self,
        nav: &mut N,
        item: &ItemReference,
    ) -> crate::Result<Option<Record>> {
        if !self.load(nav, &item.detail_url).await? {
            tracing::warn!(
                "Skipping {}: {} did not load",
                item.identifier,
                item.detail_url
            );
            return Ok(None);
        }

        let interstitial_timeout = self.crawler.interstitial_timeout();
        clear_interstitials(nav, &self.interstitials, interstitial_timeout).await;

        if let Some(ready) = &self.ready_selector {
            if !nav.wait_for(ready, self.crawler.ready_timeout()).await {
                tracing::warn!(
                    "Page unready: {} not found on {} within {:?}",
                    ready,
                    item.detail_url,
                    self.crawler.ready_timeout()
                );
            }
        }

        clear_interstitials(nav, &self.interstitials, interstitial_timeout).await;

        let record = self
            .extractor
            .extract_record(&item.identifier, &nav.snapshot());
        Ok(record)
    }

    async fn load<N: Navigator + ?Sized>(&self, nav: &mut N, url: &str) -> crate::Result<bool> {
        let attempts = self.crawler.detail_retries + 1;
        for attempt in 1..=attempts {
            if attempt > 1 {
                pause(self.crawler.retry_backoff).await;
            }
            match nav.navigate(url).await {
                Ok(()) => return Ok(true),
                Err(e) if e.is_fatal() => return Err(CrawlError::SessionLost(e.to_string())),
                Err(e) => {
                    tracing::warn!("Detail load attempt {}/{} failed: {}", attempt, attempts, e)
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::navigator::FixtureNavigator;
    use crate::record::FieldValue;

    const DETAIL: &str = "https://dir.example/brokers/jane-doe";

    fn config() -> Config {
        parse_config(
            r##"
            [directory]
            name = "Test Directory"
            start-url = "https://dir.example/brokers"

            [crawler]
            ready-timeout-ms = 100
            retry-backoff = { min-ms = 0, max-ms = 0 }

            [listing]
            link-selectors = ["a.broker"]

            [detail]
            ready-selector = "h1.broker-name"

            [interstitials]
            dismiss = ["#accept-cookies"]
            remove = ["div.modal"]

            [output]
            path = "unused.csv"

            [[field]]
            name = "Broker Name"
            strategies = [{ kind = "css", selector = "h1.broker-name" }]

            [[field]]
            name = "Website"
            strategies = [
                { kind = "css", selector = "a.website", attr = "href" },
                { kind = "external-link" },
                { kind = "page-url" },
            ]

            [[field]]
            name = "Company"
            strategies = [{ kind = "css", selector = ".company" }]
            "##,
        )
        .unwrap()
    }

    fn item() -> ItemReference {
        ItemReference::new("Jane Doe", DETAIL)
    }

    #[tokio::test]
    async fn test_visit_extracts_with_fallbacks() {
        let mut nav = FixtureNavigator::new().with_page(
            DETAIL,
            r#"<html><body>
                <div class="modal"><a href="https://ads.example">Sponsored</a></div>
                <button id="accept-cookies">OK</button>
                <h1 class="broker-name">Jane Doe</h1>
                <a href="https://janedoe-advisors.com">Site</a>
            </body></html>"#,
        );
        let visitor = DetailVisitor::new(&config()).unwrap();

        let record = visitor.visit(&mut nav, &item()).await.unwrap().unwrap();
        assert_eq!(record.identifier(), "Jane Doe");
        assert_eq!(record.get("Broker Name"), &FieldValue::Found("Jane Doe".into()));
        assert_eq!(
            record.get("Website"),
            &FieldValue::Found("https://janedoe-advisors.com/".into())
        );
        assert_eq!(record.get("Company"), &FieldValue::NotFound);
        assert_eq!(nav.current_url(), Some(DETAIL));
    }

    #[tokio::test]
    async fn test_unready_page_still_yields_record() {
        let mut nav = FixtureNavigator::new()
            .with_page(DETAIL, "<html><body><p>Loading...</p></body></html>");
        let visitor = DetailVisitor::new(&config()).unwrap();

        let record = visitor.visit(&mut nav, &item()).await.unwrap().unwrap();
        assert_eq!(record.get("Broker Name"), &FieldValue::NotFound);
        assert_eq!(record.get("Company"), &FieldValue::NotFound);
        // the page address is the last fallback
        assert_eq!(record.get("Website"), &FieldValue::Found(DETAIL.into()));
    }

    #[tokio::test]
    async fn test_failed_load_is_skipped_after_retries() {
        let mut nav = FixtureNavigator::new()
            .with_page(DETAIL, "<h1 class=\"broker-name\">Jane Doe</h1>")
            .with_failures(DETAIL, 3);
        let visitor = DetailVisitor::new(&config()).unwrap();

        assert!(visitor.visit(&mut nav, &item()).await.unwrap().is_none());
        assert_eq!(nav.visit_count(DETAIL), 3);
    }

    #[tokio::test]
    async fn test_closed_session_is_fatal() {
        let mut nav = FixtureNavigator::new().with_page(DETAIL, "<h1>Jane</h1>");
        nav.close().await.unwrap();
        let visitor = DetailVisitor::new(&config()).unwrap();

        let result = visitor.visit(&mut nav, &item()).await;
        assert!(matches!(result, Err(CrawlError::SessionLost(_))));
    }
}
