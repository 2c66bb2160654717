//! dircrawl: a resumable business-directory crawler
//!
//! This crate walks a paginated web directory, visits every entity's detail page,
//! extracts a configurable set of fields with ordered fallback strategies, and
//! appends the results to a record store without ever capturing the same entity twice.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod navigator;
pub mod output;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only failures that end a crawl run surface here. Per-item and per-page
/// failures are absorbed where they happen.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] storage::StoreError),

    #[error("Navigation session lost: {0}")]
    SessionLost(String),

    #[error("Human gate failed: {0}")]
    Gate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlOutcome};
pub use record::{FieldValue, ItemReference, Record};
