//! Crawler module: the resumable crawl engine
//!
//! This module contains the core crawling logic, including:
//! - Walking paginated listing pages for item references
//! - Visiting detail pages and extracting records
//! - Pacing, retries and interstitial handling
//! - Overall crawl coordination, checkpointing and draining

mod coordinator;
pub mod gate;
mod interstitial;
pub mod pacing;
mod visitor;
mod walker;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use gate::{HumanGate, OpenGate, PromptGate};
pub use interstitial::clear_interstitials;
pub use visitor::DetailVisitor;
pub use walker::ListingWalker;
