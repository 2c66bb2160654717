//! Running tally and end-of-run summary

use crate::crawler::CrawlOutcome;
use chrono::{DateTime, Utc};

/// Counters kept while a crawl runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlTally {
    /// Detail pages the crawl attempted
    pub processed: usize,
    /// References dropped because the entity was already captured
    pub skipped: usize,
    /// Detail pages that never loaded
    pub failed: usize,
    /// Records written to the store this run
    pub saved: usize,
    /// Listing pages read
    pub listing_pages: u32,
}

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub directory: String,
    pub outcome: CrawlOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tally: CrawlTally,
    /// Records staged but not written (only non-zero after a persistence failure)
    pub unsaved: usize,
    /// Identifiers in the dataset at the end of the run
    pub total_known: usize,
}

impl CrawlSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary: {} ===\n", summary.directory);

    println!("Run:");
    println!("  Outcome: {:?}", summary.outcome);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", summary.duration_seconds());
    println!();

    println!("Progress:");
    println!("  Listing pages: {}", summary.tally.listing_pages);
    println!("  Processed: {}", summary.tally.processed);
    println!("  Skipped (already captured): {}", summary.tally.skipped);
    println!("  Failed: {}", summary.tally.failed);
    println!("  Saved: {}", summary.tally.saved);
    if summary.unsaved > 0 {
        println!("  Unsaved: {}", summary.unsaved);
    }
    println!();

    println!("Dataset: {} records", summary.total_known);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_duration() {
        let started_at = Utc::now();
        let summary = CrawlSummary {
            directory: "Axial".to_string(),
            outcome: CrawlOutcome::Completed,
            started_at,
            finished_at: started_at + Duration::seconds(90),
            tally: CrawlTally::default(),
            unsaved: 0,
            total_known: 12,
        };
        assert_eq!(summary.duration_seconds(), 90);
    }
}
