//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Loading the checkpoint and opening the start page
//! - Waiting on the human gate
//! - Pulling references from the listing walker and visiting each detail page
//! - Staging records and flushing batches
//! - Draining on completion, fatal error or interruption

use crate::config::Config;
use crate::crawler::gate::HumanGate;
use crate::crawler::pacing::pause;
use crate::crawler::visitor::DetailVisitor;
use crate::crawler::walker::ListingWalker;
use crate::navigator::Navigator;
use crate::output::{CrawlSummary, CrawlTally};
use crate::storage::{Checkpoint, RecordStore};
use crate::CrawlError;
use chrono::Utc;
use std::future::Future;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Pagination was exhausted
    Completed,
    /// The shutdown signal arrived first
    Interrupted,
    /// A fatal error stopped the crawl
    Failed,
}

/// Main crawler coordinator structure
///
/// Owns the navigation session, the checkpoint (and through it the record
/// store) and the human gate for the duration of a run.
pub struct Coordinator<N, S, G> {
    config: Config,
    navigator: N,
    checkpoint: Checkpoint<S>,
    gate: G,
    visitor: DetailVisitor,
    walker: Option<ListingWalker>,
    tally: CrawlTally,
    summary: Option<CrawlSummary>,
}

impl<N, S, G> Coordinator<N, S, G>
where
    N: Navigator,
    S: RecordStore,
    G: HumanGate,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The directory profile
    /// * `navigator` - Session used for every page load
    /// * `store` - Dataset the records are appended to
    /// * `gate` - Manual step awaited after the start page opens
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - A field strategy failed to compile
    pub fn new(config: Config, navigator: N, store: S, gate: G) -> crate::Result<Self> {
        let visitor = DetailVisitor::new(&config)?;
        let checkpoint = Checkpoint::new(store, config.crawler.flush_threshold);
        Ok(Self {
            config,
            navigator,
            checkpoint,
            gate,
            visitor,
            walker: None,
            tally: CrawlTally::default(),
            summary: None,
        })
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn checkpoint(&self) -> &Checkpoint<S> {
        &self.checkpoint
    }

    pub fn tally(&self) -> CrawlTally {
        self.tally
    }

    /// Summary of the last run, including failed ones
    pub fn summary(&self) -> Option<&CrawlSummary> {
        self.summary.as_ref()
    }

    /// Runs the crawl until it completes or Ctrl-C is pressed
    pub async fn run(&mut self) -> crate::Result<CrawlSummary> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs the crawl until it completes or `shutdown` resolves
    ///
    /// Whatever ends the crawl, the pending batch gets one final flush and
    /// the navigation session is closed exactly once before returning.
    pub async fn run_until<F>(&mut self, shutdown: F) -> crate::Result<CrawlSummary>
    where
        F: Future<Output = ()>,
    {
        let started_at = Utc::now();
        tracing::info!("Starting crawl of {}", self.config.directory.name);

        let result = tokio::select! {
            biased;
            () = shutdown => {
                tracing::warn!("Interrupted, saving progress");
                Ok(CrawlOutcome::Interrupted)
            }
            result = self.crawl() => result.map(|()| CrawlOutcome::Completed),
        };

        self.record_listing_progress();
        let result = self.drain(result).await;
        let outcome = match &result {
            Ok(outcome) => *outcome,
            Err(_) => CrawlOutcome::Failed,
        };

        let summary = CrawlSummary {
            directory: self.config.directory.name.clone(),
            outcome,
            started_at,
            finished_at: Utc::now(),
            tally: self.tally,
            unsaved: self.checkpoint.pending_len(),
            total_known: self.checkpoint.known_len(),
        };
        self.summary = Some(summary.clone());

        match result {
            Ok(_) => {
                tracing::info!(
                    "Crawl {:?}: {} processed, {} skipped, {} failed, {} saved",
                    outcome,
                    self.tally.processed,
                    self.tally.skipped,
                    self.tally.failed,
                    self.tally.saved
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                Err(e)
            }
        }
    }

    /// Copies the walker's counters into the tally
    ///
    /// Skips after the last emitted reference only show up here, so this
    /// also runs when the crawl is cut short.
    fn record_listing_progress(&mut self) {
        if let Some(walker) = &self.walker {
            self.tally.skipped = walker.skipped();
            self.tally.listing_pages = walker.pages_walked();
        }
    }

    /// Final forced flush and session close
    async fn drain(&mut self, result: crate::Result<CrawlOutcome>) -> crate::Result<CrawlOutcome> {
        let mut result = result;

        match self.checkpoint.flush(true) {
            Ok(saved) => self.tally.saved += saved,
            Err(e) => {
                tracing::error!(
                    "Could not save {} pending records: {}",
                    self.checkpoint.pending_len(),
                    e
                );
                if result.is_ok() {
                    result = Err(e.into());
                }
            }
        }

        if let Err(e) = self.navigator.close().await {
            tracing::warn!("Closing the navigation session failed: {}", e);
        }
        result
    }

    async fn crawl(&mut self) -> crate::Result<()> {
        let existing = self.checkpoint.load()?;
        tracing::info!(
            "{} records already captured, saving every {} records",
            existing,
            self.checkpoint.threshold()
        );

        let start_url = self.config.directory.start_url.clone();
        let walker = match self.navigator.navigate(&start_url).await {
            Ok(()) => ListingWalker::on_current_page(&self.config),
            Err(e) if e.is_fatal() => return Err(CrawlError::SessionLost(e.to_string())),
            Err(e) => {
                tracing::warn!("Start page failed to load: {}", e);
                ListingWalker::new(&self.config)
            }
        };

        let walker = self.walker.insert(walker);

        self.gate.wait_ready().await?;

        while let Some(item) = walker.next(&mut self.navigator, &self.checkpoint).await? {
            self.tally.skipped = walker.skipped();
            self.tally.listing_pages = walker.pages_walked();
            self.tally.processed += 1;

            match self.visitor.visit(&mut self.navigator, &item).await? {
                Some(record) => {
                    tracing::info!(
                        "Captured {} ({} fields found)",
                        record.identifier(),
                        record.found_count()
                    );
                    self.checkpoint.stage(record);
                    self.tally.saved += self.checkpoint.flush(false)?;

                    pause(self.config.crawler.request_delay).await;
                    if let Err(e) = self.navigator.go_back().await {
                        if e.is_fatal() {
                            return Err(CrawlError::SessionLost(e.to_string()));
                        }
                        tracing::debug!("Could not return to listing: {}", e);
                    }
                }
                None => {
                    tracing::warn!("Failed to capture {}", item.identifier);
                    self.tally.failed += 1;
                }
            }

            tracing::info!(
                "Progress: {} processed, {} skipped, {} failed, {} saved",
                self.tally.processed,
                self.tally.skipped,
                self.tally.failed,
                self.tally.saved
            );
        }

        tracing::info!(
            "Pagination exhausted after {} listing pages",
            walker.pages_walked()
        );
        Ok(())
    }
}
