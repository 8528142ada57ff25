//! CineIndex main entry point
//!
//! This is the command-line interface for the CineIndex media indexer.

use cineindex::config::{load_config_with_hash, Config};
use cineindex::crawler::{run_index, CrawlMode, CrawlPolicy};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CineIndex: a media indexer for directory-listing web servers
///
/// CineIndex crawls autoindex, h5ai and DataTables directory listings into a
/// SQLite catalog of directories and media files. Re-crawls are incremental by
/// default and skip directories whose listing has not changed.
#[derive(Parser, Debug)]
#[command(name = "cineindex")]
#[command(version)]
#[command(about = "A media indexer for directory-listing web servers", long_about = None)]
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

    /// Update the existing index, skipping unchanged directories (default behavior)
    #[arg(long, conflicts_with = "full")]
    incremental: bool,

    /// Delete each root's index and rebuild it from scratch
    #[arg(long, conflicts_with = "incremental")]
    full: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let mode = if cli.full {
        CrawlMode::Full
    } else {
        CrawlMode::Incremental
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, mode)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash, mode).await?;
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
            0 => EnvFilter::new("cineindex=info,warn"),
            1 => EnvFilter::new("cineindex=debug,info"),
            2 => EnvFilter::new("cineindex=trace,debug"),
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
fn handle_dry_run(config: &Config, mode: CrawlMode) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== CineIndex Dry Run ===\n");

    let policy = CrawlPolicy::from(&config.crawler);

    println!("Crawler Configuration:");
    println!("  Mode: {}", mode);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Commit interval: {} dirs", config.crawler.commit_interval);
    println!("  User agent: {}", config.crawler.user_agent);

    if policy.extension_count() == 0 {
        println!("  Video extensions: (all files)");
    } else {
        println!(
            "  Video extensions ({}): {}",
            policy.extension_count(),
            config.crawler.video_extensions.join(", ")
        );
    }
    println!(
        "  Blocked dirs ({}): {}",
        policy.blocked_count(),
        config.crawler.blocked_dirs.join(", ")
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let roots = config.roots()?;
    println!("\nRoots ({}):", roots.len());
    for root in &roots {
        match &root.cookie_file {
            Some(cookie) => println!("  - [{}] {} (cookies: {})", root.tag, root.url, cookie.display()),
            None => println!("  - [{}] {}", root.tag, root.url),
        }
    }

    println!("\n✓ Configuration is valid");
    if roots.is_empty() {
        println!("✓ No roots configured; nothing would be crawled");
    } else {
        println!("✓ Would start a {} crawl of {} root(s)", mode, roots.len());
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use cineindex::output::{load_statistics, print_statistics};
    use cineindex::storage::open_store;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let store = open_store(Path::new(&config.output.database_path))?;

    // Load statistics
    let stats = load_statistics(&store)?;

    let tags: HashMap<String, String> = config
        .roots()?
        .into_iter()
        .map(|root| (root.url, root.tag))
        .collect();

    // Print statistics
    print_statistics(&stats, &tags);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    mode: CrawlMode,
) -> Result<(), Box<dyn std::error::Error>> {
    match mode {
        CrawlMode::Full => tracing::info!("Starting full crawl (rebuilding each root)"),
        CrawlMode::Incremental => {
            tracing::info!("Starting incremental crawl (unchanged directories are skipped)")
        }
    }

    // Run the crawler
    match run_index(config, config_hash, mode).await {
        Ok(reports) => {
            for report in &reports {
                println!(
                    "{}: dirs={}, skipped={}, files={}, time={:.1}s",
                    report.root,
                    report.processed_dirs,
                    report.skipped_dirs(),
                    report.indexed_files,
                    report.elapsed.as_secs_f64()
                );
            }
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
