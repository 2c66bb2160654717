//! Output module for reporting on crawls and datasets
//!
//! This module handles:
//! - The running tally and the final summary of a crawl run
//! - Field coverage statistics over a stored dataset

pub mod stats;
mod summary;

pub use stats::{compute_statistics, load_statistics, print_statistics, DatasetStatistics};
pub use summary::{print_summary, CrawlSummary, CrawlTally};
