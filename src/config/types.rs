use crate::extract::FieldSpec;
use crate::storage::DEFAULT_FLUSH_THRESHOLD;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure: one directory profile
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub listing: ListingConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub detail: DetailConfig,
    #[serde(default)]
    pub interstitials: InterstitialConfig,
    pub output: OutputConfig,
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldSpec>,
}

impl Config {
    /// Field names in declaration order; these are the store's data columns
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// The directory being crawled
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DirectoryConfig {
    /// Display name used in logs and the summary
    pub name: String,

    /// First listing page
    pub start_url: String,

    /// Whether a person must confirm access (consent form, login) before crawling
    #[serde(default = "default_true")]
    pub manual_gate: bool,
}

/// Crawl pacing, retry and batching behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of staged records that triggers a write to the store
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,

    /// Reloads attempted for a listing page that fails to load
    #[serde(default = "default_listing_retries")]
    pub listing_retries: u32,

    /// Reloads attempted for a detail page that fails to load
    #[serde(default = "default_detail_retries")]
    pub detail_retries: u32,

    /// Upper bound for page-readiness waits (milliseconds)
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Upper bound for consent-dialog waits (milliseconds)
    #[serde(default = "default_interstitial_timeout_ms")]
    pub interstitial_timeout_ms: u64,

    /// Per-request network timeout for the HTTP backend (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Pause after every captured record
    #[serde(default = "default_request_delay")]
    pub request_delay: DelayRange,

    /// Pause before reloading a page that failed
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: DelayRange,
}

impl CrawlerConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn interstitial_timeout(&self) -> Duration {
        Duration::from_millis(self.interstitial_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            flush_threshold: default_flush_threshold(),
            listing_retries: default_listing_retries(),
            detail_retries: default_detail_retries(),
            ready_timeout_ms: default_ready_timeout_ms(),
            interstitial_timeout_ms: default_interstitial_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            request_delay: default_request_delay(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

/// Inclusive range for a randomized pause (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const NONE: DelayRange = DelayRange { min_ms: 0, max_ms: 0 };

    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// User-agent pool for the HTTP backend
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// One entry is picked at random when a session is created
    #[serde(default = "default_user_agents")]
    pub pool: Vec<String>,
}

impl UserAgentConfig {
    /// Picks the user agent for a new session
    pub fn choose(&self) -> &str {
        self.pool
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: default_user_agents(),
        }
    }
}

/// Which part of an entity link identifies the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierSource {
    /// The link's display text (e.g. the company name)
    #[default]
    Text,
    /// The resolved detail-page address
    Href,
}

/// How entity links are found on listing pages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListingConfig {
    /// Entity link selectors, tried in order; the first one yielding links wins
    pub link_selectors: Vec<String>,

    #[serde(default)]
    pub identifier: IdentifierSource,

    /// Element that must be present for a listing page to count as loaded
    #[serde(default)]
    pub ready_selector: Option<String>,

    /// Links on the start page leading to separate listings (regions,
    /// categories); tried in order like `link-selectors`
    ///
    /// When set, the start page is only an index and each linked listing is
    /// paginated in turn.
    #[serde(default)]
    pub seed_selectors: Vec<String>,
}

/// How the next listing page is located
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PaginationConfig {
    /// Look for a link whose text is the next page number
    #[serde(default = "default_true")]
    pub numbered: bool,

    /// Elements considered as numbered page links
    #[serde(default = "default_numbered_selector")]
    pub numbered_selector: String,

    /// Selectors for a "next page" control, tried in order
    #[serde(default)]
    pub next_selectors: Vec<String>,

    /// Link texts identifying a "next page" control (case-insensitive)
    #[serde(default = "default_next_texts")]
    pub next_texts: Vec<String>,

    /// Stop after this many pages of one listing sequence
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            numbered: true,
            numbered_selector: default_numbered_selector(),
            next_selectors: Vec::new(),
            next_texts: default_next_texts(),
            max_pages: None,
        }
    }
}

/// Detail page behavior
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailConfig {
    /// Element expected on every detail page once it has rendered
    #[serde(default)]
    pub ready_selector: Option<String>,
}

/// Consent dialogs and overlays to clear before reading a page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterstitialConfig {
    /// Controls to activate (e.g. "Accept Cookies" buttons)
    #[serde(default)]
    pub dismiss: Vec<String>,

    /// Elements to remove outright (e.g. modal overlays)
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreFormat {
    #[default]
    Csv,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the dataset file
    pub path: String,

    #[serde(default)]
    pub format: StoreFormat,
}

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36";

fn default_true() -> bool {
    true
}
fn default_flush_threshold() -> usize {
    DEFAULT_FLUSH_THRESHOLD
}
fn default_listing_retries() -> u32 {
    3
}
fn default_detail_retries() -> u32 {
    2
}
fn default_ready_timeout_ms() -> u64 {
    10_000
}
fn default_interstitial_timeout_ms() -> u64 {
    3_000
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_request_delay() -> DelayRange {
    DelayRange::new(500, 1_000)
}
fn default_retry_backoff() -> DelayRange {
    DelayRange::new(2_000, 5_000)
}
fn default_numbered_selector() -> String {
    "a".to_string()
}
fn default_next_texts() -> Vec<String> {
    vec!["Next".to_string()]
}
fn default_user_agents() -> Vec<String> {
    vec![
        DEFAULT_USER_AGENT.to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/112.0".to_string(),
    ]
}
