//! Listing walker
//!
//! Pulls item references out of a paginated directory one at a time. Each
//! listing page is read completely when it is loaded (entity links plus the
//! address of the following page), so the crawl is free to visit detail
//! pages between calls to [`ListingWalker::next`].
//!
//! A directory split into regions starts from an index page instead. With
//! `listing.seed-selectors` set, the first page only supplies the addresses
//! of the regional listings, and each one is paginated in turn. The regions
//! share one emitted set and one cycle guard.

use crate::config::{
    Config, CrawlerConfig, IdentifierSource, InterstitialConfig, ListingConfig, PaginationConfig,
};
use crate::crawler::interstitial::clear_interstitials;
use crate::crawler::pacing::pause;
use crate::navigator::{Element, Navigator, Page};
use crate::record::ItemReference;
use crate::storage::{Checkpoint, RecordStore};
use crate::CrawlError;
use std::collections::{HashSet, VecDeque};

/// Where the next listing page comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    /// The page the session is showing right now
    Current,
    /// An address still to be loaded
    Address(String),
    /// No further listing page
    Done,
}

pub struct ListingWalker {
    listing: ListingConfig,
    pagination: PaginationConfig,
    interstitials: InterstitialConfig,
    crawler: CrawlerConfig,
    cursor: Cursor,
    queue: VecDeque<ItemReference>,
    /// Seed listings not yet walked
    seeds: VecDeque<String>,
    index_pending: bool,
    /// Page number within the current paginated sequence
    page_number: u32,
    pages_walked: u32,
    visited_pages: HashSet<String>,
    emitted: HashSet<String>,
    skipped: usize,
}

impl ListingWalker {
    /// Walker that starts by loading the directory's start address
    pub fn new(config: &Config) -> Self {
        Self::with_cursor(config, Cursor::Address(config.directory.start_url.clone()))
    }

    /// Walker that reads the page the session already shows as the first
    /// listing page
    pub fn on_current_page(config: &Config) -> Self {
        Self::with_cursor(config, Cursor::Current)
    }

    fn with_cursor(config: &Config, cursor: Cursor) -> Self {
        Self {
            listing: config.listing.clone(),
            pagination: config.pagination.clone(),
            interstitials: config.interstitials.clone(),
            crawler: config.crawler.clone(),
            cursor,
            queue: VecDeque::new(),
            seeds: VecDeque::new(),
            index_pending: !config.listing.seed_selectors.is_empty(),
            page_number: 0,
            pages_walked: 0,
            visited_pages: HashSet::new(),
            emitted: HashSet::new(),
            skipped: 0,
        }
    }

    /// Listing pages read so far
    pub fn pages_walked(&self) -> u32 {
        self.pages_walked
    }

    /// References dropped because their identifier was already captured
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the next reference to visit, or `None` once pagination is
    /// exhausted
    ///
    /// Identifiers the checkpoint already has are skipped and never
    /// returned. Only session loss is an error.
    pub async fn next<N, S>(
        &mut self,
        nav: &mut N,
        checkpoint: &Checkpoint<S>,
    ) -> crate::Result<Option<ItemReference>>
    where
        N: Navigator + ?Sized,
        S: RecordStore,
    {
        loop {
            if let Some(item) = self.queue.pop_front() {
                if checkpoint.has(&item.identifier) {
                    tracing::debug!("Skipping {} (already captured)", item.identifier);
                    self.skipped += 1;
                    continue;
                }
                if !self.emitted.insert(item.identifier.clone()) {
                    tracing::debug!("Skipping {} (listed twice)", item.identifier);
                    continue;
                }
                return Ok(Some(item));
            }

            match std::mem::replace(&mut self.cursor, Cursor::Done) {
                Cursor::Done => match self.next_seed() {
                    Some(seed) => self.cursor = Cursor::Address(seed),
                    None => return Ok(None),
                },
                cursor => self.advance(nav, cursor).await?,
            }
        }
    }

    /// Loads one listing page, queues its references and sets the cursor
    async fn advance<N: Navigator + ?Sized>(
        &mut self,
        nav: &mut N,
        cursor: Cursor,
    ) -> crate::Result<()> {
        if !self.load(nav, &cursor).await? {
            tracing::warn!(
                "Listing page {} did not load after {} retries, stopping",
                self.page_number + 1,
                self.crawler.listing_retries
            );
            return Ok(());
        }

        if let Cursor::Address(address) = &cursor {
            self.visited_pages.insert(address.clone());
        }
        if let Some(url) = nav.current_url() {
            self.visited_pages.insert(url.to_string());
        }

        if self.index_pending {
            self.index_pending = false;
            let seeds = self.read_seeds(&nav.snapshot());
            tracing::info!("Index page: {} listings to walk", seeds.len());
            self.seeds.extend(seeds);
            return Ok(());
        }

        self.page_number += 1;
        self.pages_walked += 1;

        let (references, next) = self.read_listing(&nav.snapshot());
        tracing::info!(
            "Listing page {}: {} entities",
            self.page_number,
            references.len()
        );
        self.queue.extend(references);

        self.cursor = match next {
            None => {
                tracing::info!("No next page after page {}", self.page_number);
                Cursor::Done
            }
            Some(_) if self.reached_max_pages() => {
                tracing::info!("Reached max-pages ({})", self.page_number);
                Cursor::Done
            }
            Some(url) if self.visited_pages.contains(&url) => {
                tracing::warn!("Next page {} was already visited, stopping", url);
                Cursor::Done
            }
            Some(url) => Cursor::Address(url),
        };
        Ok(())
    }

    /// Starts the next seed listing, skipping addresses already walked
    fn next_seed(&mut self) -> Option<String> {
        while let Some(seed) = self.seeds.pop_front() {
            if self.visited_pages.contains(&seed) {
                tracing::debug!("Seed listing {} already walked", seed);
                continue;
            }
            tracing::info!("Walking listing {}", seed);
            self.page_number = 0;
            return Some(seed);
        }
        None
    }

    /// Listing addresses linked from an index page, in document order
    fn read_seeds(&self, page: &Page) -> Vec<String> {
        for selector in &self.listing.seed_selectors {
            let links = page.references(selector);
            if links.is_empty() {
                tracing::debug!("No seed links for {}", selector);
                continue;
            }
            let mut seen = HashSet::new();
            return links
                .into_iter()
                .map(|(_, href)| href)
                .filter(|href| seen.insert(href.clone()))
                .collect();
        }
        Vec::new()
    }

    fn reached_max_pages(&self) -> bool {
        self.pagination
            .max_pages
            .is_some_and(|max| self.page_number >= max)
    }

    /// Loads the cursor's page, retrying with backoff
    ///
    /// Returns false once every attempt failed.
    async fn load<N: Navigator + ?Sized>(
        &self,
        nav: &mut N,
        cursor: &Cursor,
    ) -> crate::Result<bool> {
        let attempts = self.crawler.listing_retries + 1;
        for attempt in 1..=attempts {
            if attempt > 1 {
                pause(self.crawler.retry_backoff).await;
            }

            let loaded = match (cursor, attempt) {
                (Cursor::Current, 1) => Ok(()),
                (Cursor::Current, _) => nav.reload().await,
                (Cursor::Address(url), _) => nav.navigate(url).await,
                (Cursor::Done, _) => return Ok(false),
            };
            if let Err(e) = loaded {
                if e.is_fatal() {
                    return Err(CrawlError::SessionLost(e.to_string()));
                }
                tracing::warn!("Listing load attempt {}/{} failed: {}", attempt, attempts, e);
                continue;
            }

            clear_interstitials(nav, &self.interstitials, self.crawler.interstitial_timeout())
                .await;

            if let Some(ready) = &self.listing.ready_selector {
                if !nav.wait_for(ready, self.crawler.ready_timeout()).await {
                    tracing::warn!(
                        "Listing not ready ({} missing), attempt {}/{}",
                        ready,
                        attempt,
                        attempts
                    );
                    continue;
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Entity references in document order, plus the next page's address
    fn read_listing(&self, page: &Page) -> (Vec<ItemReference>, Option<String>) {
        let mut links = Vec::new();
        for selector in &self.listing.link_selectors {
            links = page.references(selector);
            if !links.is_empty() {
                break;
            }
            tracing::debug!("No entity links for {}", selector);
        }

        let references = links
            .into_iter()
            .filter_map(|(text, href)| {
                let identifier = match self.listing.identifier {
                    IdentifierSource::Text => text,
                    IdentifierSource::Href => href.clone(),
                };
                let identifier = identifier.trim();
                (!identifier.is_empty()).then(|| ItemReference::new(identifier, href))
            })
            .collect();

        (references, self.next_page(page))
    }

    /// Finds the next listing page: numbered link, then "Next" controls
    fn next_page(&self, page: &Page) -> Option<String> {
        let usable = |el: &Element| {
            if el.is_disabled() {
                return None;
            }
            page.resolve(el.href()?)
        };

        if self.pagination.numbered {
            let target = (self.page_number + 1).to_string();
            let numbered = page
                .find_all(&self.pagination.numbered_selector)
                .into_iter()
                .find(|el| el.text() == target)
                .and_then(|el| usable(&el));
            if numbered.is_some() {
                return numbered;
            }
        }

        for selector in &self.pagination.next_selectors {
            if let Some(url) = page.find(selector).and_then(|el| usable(&el)) {
                return Some(url);
            }
        }

        if self.pagination.next_texts.is_empty() {
            return None;
        }
        page.find_all("a")
            .into_iter()
            .filter(|el| {
                let label = el.text().trim_matches(|c: char| !c.is_alphanumeric());
                self.pagination
                    .next_texts
                    .iter()
                    .any(|t| label.eq_ignore_ascii_case(t.trim()))
            })
            .find_map(|el| usable(&el))
    }
}
