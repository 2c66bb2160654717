//! dircrawl main entry point
//!
//! This is the command-line interface for the dircrawl directory crawler.

use clap::Parser;
use dircrawl::config::{load_config_with_hash, Config, StoreFormat};
use dircrawl::crawler::{Coordinator, HumanGate, OpenGate, PromptGate};
use dircrawl::extract::Strategy;
use dircrawl::navigator::HttpNavigator;
use dircrawl::output::{load_statistics, print_statistics, print_summary};
use dircrawl::storage::open_store;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// dircrawl: a resumable business-directory crawler
///
/// dircrawl walks a paginated web directory, visits each entity's detail
/// page, and appends one record per entity to a CSV or SQLite dataset.
/// Entities already in the dataset are never visited again, so an
/// interrupted crawl resumes where it stopped.
#[derive(Parser, Debug)]
#[command(name = "dircrawl")]
#[command(version = "1.0.0")]
#[command(about = "A resumable business-directory crawler", long_about = None)]
struct Cli {
    /// Path to TOML directory profile
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the profile and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show field coverage of the stored dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Start crawling without waiting for ENTER
    #[arg(long)]
    no_gate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.no_gate).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dircrawl=info,warn"),
            1 => EnvFilter::new("dircrawl=debug,info"),
            2 => EnvFilter::new("dircrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn describe_strategy(strategy: &Strategy) -> String {
    match strategy {
        Strategy::Css {
            selector,
            attr: Some(attr),
        } => format!("css {} [{}]", selector, attr),
        Strategy::Css {
            selector,
            attr: None,
        } => format!("css {}", selector),
        Strategy::ExternalLink {
            exclude_host: Some(host),
        } => format!("external link (not {})", host),
        Strategy::ExternalLink { exclude_host: None } => "external link".to_string(),
        Strategy::Pattern { regex } => format!("pattern /{}/", regex),
        Strategy::PageUrl => "page address".to_string(),
        Strategy::Constant { value } => format!("constant \"{}\"", value),
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== dircrawl Dry Run ===\n");

    println!("Directory:");
    println!("  Name: {}", config.directory.name);
    println!("  Start URL: {}", config.directory.start_url);
    println!("  Manual gate: {}", config.directory.manual_gate);

    println!("\nCrawler Configuration:");
    println!("  Flush threshold: {}", config.crawler.flush_threshold);
    println!(
        "  Retries: listing {}, detail {}",
        config.crawler.listing_retries, config.crawler.detail_retries
    );
    println!(
        "  Request delay: {}-{}ms",
        config.crawler.request_delay.min_ms, config.crawler.request_delay.max_ms
    );
    println!(
        "  Retry backoff: {}-{}ms",
        config.crawler.retry_backoff.min_ms, config.crawler.retry_backoff.max_ms
    );
    println!("  User agents in pool: {}", config.user_agent.pool.len());

    println!("\nListing:");
    for selector in &config.listing.seed_selectors {
        println!("  Seed: {}", selector);
    }
    for selector in &config.listing.link_selectors {
        println!("  - {}", selector);
    }
    if let Some(max) = config.pagination.max_pages {
        println!("  Max pages: {}", max);
    }

    println!("\nFields ({}):", config.fields.len());
    for field in &config.fields {
        println!("  - {}", field.name);
        for (i, strategy) in field.strategies.iter().enumerate() {
            println!("    {}. {}", i + 1, describe_strategy(strategy));
        }
    }

    println!("\nOutput:");
    let format = match config.output.format {
        StoreFormat::Csv => "csv",
        StoreFormat::Sqlite => "sqlite",
    };
    println!("  {} ({})", config.output.path, format);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows field coverage of the dataset
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Dataset: {}\n", config.output.path);

    let columns = config.field_names();
    let mut store = open_store(&config.output, columns.clone())?;
    let stats = load_statistics(&mut store, &columns)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, no_gate: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Directory: {} ({} fields) -> {}",
        config.directory.name,
        config.fields.len(),
        config.output.path
    );

    let navigator = HttpNavigator::from_config(&config)?;
    let store = open_store(&config.output, config.field_names())?;
    let gate: Box<dyn HumanGate> = if config.directory.manual_gate && !no_gate {
        Box::new(PromptGate::default())
    } else {
        Box::new(OpenGate)
    };

    let mut coordinator = Coordinator::new(config, navigator, store, gate)?;
    let result = coordinator.run().await;

    if let Some(summary) = coordinator.summary() {
        print_summary(summary);
    }

    match result {
        Ok(_) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
