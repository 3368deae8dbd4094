//! Domain-Trawler main entry point
//!
//! This is the command-line interface for the Domain-Trawler crawler.

use clap::Parser;
use domain_trawler::config::{load_config_with_hash, Config};
use domain_trawler::crawler::{CrawlJob, Crawler};
use domain_trawler::state::CrawlReport;
use domain_trawler::storage::{open_store, FrontierStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Domain-Trawler: a frontier-driven single-domain crawler
///
/// Domain-Trawler downloads every in-scope page of one domain, keeping its
/// work queue in a shared store so that interrupted crawls resume and
/// several processes can drain the same frontier.
#[derive(Parser, Debug)]
#[command(name = "domain-trawler")]
#[command(version = "1.0.0")]
#[command(about = "A frontier-driven single-domain crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Clear the domain's frontier before crawling
    #[arg(long)]
    fresh: bool,

    /// Only download paths already in progress; do not seed or follow links
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    drain: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "fresh"])]
    dry_run: bool,

    /// Show statistics for the domain's frontier and exit
    #[arg(long, conflicts_with_all = ["dry_run", "fresh"])]
    stats: bool,
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
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config).await?;
    } else {
        handle_crawl(&config, cli.fresh, cli.drain).await?;
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
            0 => EnvFilter::new("domain_trawler=info,warn"),
            1 => EnvFilter::new("domain_trawler=debug,info"),
            2 => EnvFilter::new("domain_trawler=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let job = CrawlJob::new(&config.job)?;

    println!("=== Domain-Trawler Dry Run ===\n");

    println!("Job:");
    println!("  Domain: {}", job.domain);
    println!("  Base URL: {}", job.base_url);
    println!("  Start path: {}", job.start_path);
    println!("  Download path: {}", job.download_dir().display());
    println!("  Page limit: {}", job.page_limit);
    println!("  Follow links: {}", job.find_more_links);
    println!("  Allow: {:?}", job.allow);
    println!("  Avoid: {:?}", job.avoid);

    println!("\nFetch:");
    println!("  Delay: {}ms", config.fetch.delay_ms);
    println!(
        "  Timeouts: {}s connect, {}s read",
        config.fetch.connect_timeout_secs, config.fetch.read_timeout_secs
    );
    println!("  Attempts: {}", config.fetch.max_attempts);
    println!("  Redirects: {}", config.fetch.max_redirects);

    println!("\nStore:");
    println!("  Backend: {:?}", config.store.backend);

    if let Some(search) = &config.search {
        println!("\nSearch:");
        println!("  Template: {}", search.path_template);
        println!("  Pages: {}..={}", search.start_page, search.max_page);
        println!(
            "  Sentinel: {} =~ /{}/",
            search.sentinel_selector, search.sentinel_pattern
        );
    }

    if let Some(page) = &config.page {
        println!("\nPage trimming:");
        println!("  Content: {}", page.content_selector);
        if let Some(image) = &page.image_selector {
            println!("  Image: {} [{}]", image, page.image_attr);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", job.url_for(&job.start_path));

    Ok(())
}

/// Handles the --stats mode: shows statistics for the domain's frontier
async fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use domain_trawler::output::{load_statistics, print_statistics, ErrorLog};

    let job = CrawlJob::new(&config.job)?;
    let store = open_store(&config.store).await?;

    let errors = ErrorLog::new(job.download_dir());
    let stats = load_statistics(store.as_ref(), &job.domain, &errors).await?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    fresh: bool,
    drain: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config.store).await?;
    let mut crawler = Crawler::from_config(config, store.clone())?;
    let domain = crawler.job().domain.clone();

    if fresh {
        tracing::info!("Starting fresh crawl of {} (clearing frontier)", domain);
        store.clear(&domain).await?;
    } else {
        tracing::info!("Starting crawl of {} (resuming any existing frontier)", domain);
    }

    let result = if drain {
        crawler.drain().await
    } else if let Some(search) = &config.search {
        match crawler.crawl_search(search).await {
            Ok(report) => {
                log_report("Search", &report);
                crawler.drain().await
            }
            Err(e) => Err(e),
        }
    } else {
        crawler.crawl_domain().await
    };

    match result {
        Ok(report) => {
            log_report("Crawl", &report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

fn log_report(label: &str, report: &CrawlReport) {
    tracing::info!(
        "{} stopped ({:?}): {} processed, {} downloaded, {} redirected, {} failed, {} skipped",
        label,
        report.stop_reason,
        report.pages_processed,
        report.downloaded,
        report.redirected,
        report.failed,
        report.skipped
    );
}
