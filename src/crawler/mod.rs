//! Crawler module for directory-listing traversal
//!
//! This module contains the core crawling logic, including:
//! - Listing page fetching with per-root cookie credentials
//! - Multi-format listing parsing (h5ai, DataTables, generic autoindex)
//! - Block and extension policy
//! - Breadth-first traversal with incremental freshness skipping

mod coordinator;
mod events;
mod fetcher;
mod parser;
mod policy;

pub use coordinator::{CrawlMode, CrawlReport, Coordinator, DEFAULT_COMMIT_INTERVAL};
pub use events::{CrawlEvent, CrawlObserver, TracingObserver};
pub use fetcher::{
    build_http_client, load_cookie_jar, parse_cookie_file, FetchError, HttpFetcher,
    NetscapeCookie, PageFetcher,
};
pub use parser::{detect_listing, parse_listing, DirEntry, FileEntry, ListingKind, ParsedPage};
pub use policy::CrawlPolicy;

use crate::config::Config;
use crate::storage::{IndexStore, SqliteStore};
use crate::IndexError;
use std::path::Path;

/// Crawls every configured root into the configured database
///
/// This is the main entry point for an indexing run. For each root it will:
/// 1. Record a run in the ledger
/// 2. Crawl the root in the requested mode
/// 3. Mark the run completed, or roll back pending writes and mark it failed
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, recorded on each run
/// * `mode` - Full rebuild or incremental update
///
/// # Returns
///
/// * `Ok(Vec<CrawlReport>)` - One report per root, in configuration order
/// * `Err(IndexError)` - A store failure aborted the run
pub async fn run_index(
    config: &Config,
    config_hash: &str,
    mode: CrawlMode,
) -> Result<Vec<CrawlReport>, IndexError> {
    let roots = config.roots()?;
    if roots.is_empty() {
        tracing::warn!("No roots configured; nothing to crawl");
        return Ok(Vec::new());
    }

    let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::from_config(&config.crawler);
    let policy = CrawlPolicy::from(&config.crawler);
    let mut observer = TracingObserver;

    tracing::info!(
        "Indexing {} root(s) in {} mode ({} extensions, {} blocked dirs)",
        roots.len(),
        mode,
        policy.extension_count(),
        policy.blocked_count()
    );

    let mut reports = Vec::with_capacity(roots.len());
    for root in &roots {
        let run_id = store.create_run(&root.url, mode.as_str(), config_hash)?;

        let result = Coordinator::new(&mut store, &fetcher, &policy, &mut observer)
            .with_commit_interval(config.crawler.commit_interval)
            .crawl_root(root, mode)
            .await;

        match result {
            Ok(report) => {
                store.complete_run(
                    run_id,
                    report.processed_dirs,
                    report.skipped_dirs(),
                    report.indexed_files,
                )?;
                reports.push(report);
            }
            Err(e) => {
                tracing::error!("Crawl of {} [{}] failed: {}", root.url, root.tag, e);
                if let Err(rollback_err) = store.rollback() {
                    tracing::warn!("Failed to roll back pending writes: {}", rollback_err);
                }
                if let Err(ledger_err) = store.fail_run(run_id) {
                    tracing::warn!("Failed to mark run {} as failed: {}", run_id, ledger_err);
                }
                return Err(e);
            }
        }
    }

    store.commit()?;

    Ok(reports)
}
