//! Crawl progress events
//!
//! The coordinator never prints. It reports what it does through a
//! [`CrawlObserver`]; [`TracingObserver`] is the default sink and turns every
//! event into a log line.

use crate::crawler::coordinator::{CrawlMode, CrawlReport};
use crate::crawler::fetcher::FetchError;

/// Something the crawler did or decided
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// Traversal of a root is starting
    Started { root: String, mode: CrawlMode },

    /// A full crawl removed the root's previous index
    RootCleared {
        root: String,
        directories: u64,
        media_files: u64,
    },

    /// A directory was (re)indexed
    DirectoryProcessed {
        url: String,
        files: usize,
        subdirs: usize,
    },

    /// A directory matched a blocked name; its subtree is pruned
    SkippedBlocked { url: String, path: String },

    /// A directory could not be fetched
    SkippedFetchFailed { url: String, error: FetchError },

    /// A directory's freshness token matched the stored one
    SkippedUnchanged { url: String },

    /// A directory was already processed earlier in this run
    SkippedRevisit { url: String },

    /// Pending writes were committed
    Committed { processed_dirs: u64 },

    /// Traversal of a root finished
    Finished { report: CrawlReport },
}

/// Receives crawl events
pub trait CrawlObserver {
    fn on_event(&mut self, event: &CrawlEvent);
}

/// Collects events, mostly useful in tests
impl CrawlObserver for Vec<CrawlEvent> {
    fn on_event(&mut self, event: &CrawlEvent) {
        self.push(event.clone());
    }
}

/// Logs every event through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_event(&mut self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Started { root, mode } => {
                tracing::info!("Starting {} crawl for {}", mode, root);
            }
            CrawlEvent::RootCleared {
                root,
                directories,
                media_files,
            } => {
                tracing::info!(
                    "Cleared existing index for {} ({} dirs, {} files)",
                    root,
                    directories,
                    media_files
                );
            }
            CrawlEvent::DirectoryProcessed {
                url,
                files,
                subdirs,
            } => {
                tracing::info!("Indexed {}: {} files, {} subdirs", url, files, subdirs);
            }
            CrawlEvent::SkippedBlocked { url, path } => {
                tracing::debug!("Skipping blocked dir {} ({})", path, url);
            }
            CrawlEvent::SkippedFetchFailed { url, error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
            }
            CrawlEvent::SkippedUnchanged { url } => {
                tracing::debug!("Unchanged since last crawl: {}", url);
            }
            CrawlEvent::SkippedRevisit { url } => {
                tracing::debug!("Already visited in this run: {}", url);
            }
            CrawlEvent::Committed { processed_dirs } => {
                tracing::debug!("Committed after {} directories", processed_dirs);
            }
            CrawlEvent::Finished { report } => {
                tracing::info!(
                    "Done {}: dirs={}, skipped={}, blocked={}, failed={}, files={}, time={:.1}s",
                    report.root,
                    report.processed_dirs,
                    report.unchanged_dirs,
                    report.blocked_dirs,
                    report.failed_dirs,
                    report.indexed_files,
                    report.elapsed.as_secs_f64()
                );
            }
        }
    }
}
