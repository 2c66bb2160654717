//! Configuration module for dircrawl
//!
//! A configuration file is a TOML "directory profile": where the directory
//! starts, how listing pages link to entities and to each other, which fields
//! to extract and with which fallback strategies, and where records go.
//!
//! # Example
//!
//! ```no_run
//! use dircrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("profiles/axial.toml")).unwrap();
//! println!("Crawling {} from {}", config.directory.name, config.directory.start_url);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DelayRange, DetailConfig, DirectoryConfig, IdentifierSource,
    InterstitialConfig, ListingConfig, OutputConfig, PaginationConfig, StoreFormat,
    UserAgentConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
