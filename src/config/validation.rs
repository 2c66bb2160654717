use crate::config::types::{
    Config, CrawlerConfig, DelayRange, DirectoryConfig, InterstitialConfig, ListingConfig,
    OutputConfig, PaginationConfig,
};
use crate::extract::{compile_field, FieldSpec};
use crate::record::IDENTIFIER_COLUMN;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_directory_config(&config.directory)?;
    validate_crawler_config(&config.crawler)?;
    validate_listing_config(&config.listing)?;
    validate_pagination_config(&config.pagination)?;
    if let Some(selector) = &config.detail.ready_selector {
        validate_selector(selector)?;
    }
    validate_interstitials(&config.interstitials)?;
    validate_output_config(&config.output)?;
    validate_fields(&config.fields)?;
    Ok(())
}

fn validate_directory_config(config: &DirectoryConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "directory name cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url '{}' must use http or https",
            config.start_url
        )));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.flush_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "flush-threshold must be >= 1, got {}",
            config.flush_threshold
        )));
    }

    for (name, value) in [
        ("ready-timeout-ms", config.ready_timeout_ms),
        ("interstitial-timeout-ms", config.interstitial_timeout_ms),
        ("request-timeout-ms", config.request_timeout_ms),
    ] {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between {} and {}ms, got {}ms",
                name, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS, value
            )));
        }
    }

    validate_delay("request-delay", &config.request_delay)?;
    validate_delay("retry-backoff", &config.retry_backoff)?;

    Ok(())
}

fn validate_delay(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min_ms > range.max_ms {
        return Err(ConfigError::Validation(format!(
            "{}: min-ms ({}) must not exceed max-ms ({})",
            name, range.min_ms, range.max_ms
        )));
    }
    Ok(())
}

fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    if config.link_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "listing needs at least one link selector".to_string(),
        ));
    }
    for selector in config.link_selectors.iter().chain(&config.seed_selectors) {
        validate_selector(selector)?;
    }
    if let Some(selector) = &config.ready_selector {
        validate_selector(selector)?;
    }
    Ok(())
}

fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    validate_selector(&config.numbered_selector)?;
    for selector in &config.next_selectors {
        validate_selector(selector)?;
    }
    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }
    Ok(())
}

fn validate_interstitials(config: &InterstitialConfig) -> Result<(), ConfigError> {
    for selector in config.dismiss.iter().chain(&config.remove) {
        validate_selector(selector)?;
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates field specs: names are unique and every strategy compiles
fn validate_fields(fields: &[FieldSpec]) -> Result<(), ConfigError> {
    if fields.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[field]] is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "field name cannot be empty".to_string(),
            ));
        }
        if name.eq_ignore_ascii_case(IDENTIFIER_COLUMN) {
            return Err(ConfigError::Validation(format!(
                "field name '{}' is reserved",
                field.name
            )));
        }
        if !seen.insert(name.to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }
        compile_field(field)?;
    }

    Ok(())
}

/// Validates that a CSS selector parses
pub fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: "selector cannot be empty".to_string(),
        });
    }
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Strategy;

    fn field(name: &str, strategies: Vec<Strategy>) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            strategies,
        }
    }

    fn css(selector: &str) -> Strategy {
        Strategy::Css {
            selector: selector.to_string(),
            attr: None,
        }
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector("a[itemprop='name']").is_ok());
        assert!(validate_selector("form > div:nth-of-type(3) > p > a").is_ok());

        assert!(validate_selector("").is_err());
        assert!(validate_selector("a[[").is_err());
    }

    #[test]
    fn test_validate_delay() {
        assert!(validate_delay("d", &DelayRange::new(500, 1000)).is_ok());
        assert!(validate_delay("d", &DelayRange::NONE).is_ok());
        assert!(validate_delay("d", &DelayRange::new(2000, 1000)).is_err());
    }

    #[test]
    fn test_validate_fields() {
        assert!(validate_fields(&[field("Website", vec![css("a")])]).is_ok());

        assert!(validate_fields(&[]).is_err());
        assert!(validate_fields(&[field("identifier", vec![css("a")])]).is_err());
        assert!(validate_fields(&[field("Website", vec![])]).is_err());
        assert!(validate_fields(&[
            field("Website", vec![css("a")]),
            field("Website", vec![css("b")]),
        ])
        .is_err());
        assert!(validate_fields(&[field(
            "Location",
            vec![Strategy::Pattern {
                regex: "(unclosed".to_string()
            }]
        )])
        .is_err());
    }

    #[test]
    fn test_validate_crawler_timeouts() {
        let mut config = CrawlerConfig::default();
        assert!(validate_crawler_config(&config).is_ok());

        config.ready_timeout_ms = 10;
        assert!(validate_crawler_config(&config).is_err());
    }
}
