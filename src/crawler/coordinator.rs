//! Crawler coordinator - breadth-first traversal of one root
//!
//! This module contains the crawl loop that walks a root's directory tree:
//! - Draining a FIFO queue of `(directory, parent)` pairs seeded with the root
//! - Pruning blocked directories before they are fetched
//! - Fetching and parsing listing pages
//! - Skipping directories whose freshness token is unchanged (incremental mode)
//! - Writing directory and media rows, committing periodically
//!
//! Traversal is strictly sequential: one fetch is outstanding at a time and a
//! directory's writes finish before the next directory is dequeued.

use crate::config::Root;
use crate::crawler::events::{CrawlEvent, CrawlObserver};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::parser::{parse_listing, ParsedPage};
use crate::crawler::policy::CrawlPolicy;
use crate::storage::{DirectoryRecord, IndexStore, MediaFileRecord};
use crate::url::{last_segment, path_from_root};
use crate::IndexError;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Default number of processed directories between commits
pub const DEFAULT_COMMIT_INTERVAL: usize = 20;

/// How a root is crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlMode {
    /// Delete the root's index first and rebuild it from scratch
    Full,

    /// Keep the existing index and skip directories whose token is unchanged
    #[default]
    Incremental,
}

impl CrawlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlMode::Full => "full",
            CrawlMode::Incremental => "incremental",
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of crawling one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub root: String,
    pub mode: CrawlMode,
    pub processed_dirs: u64,
    pub unchanged_dirs: u64,
    pub blocked_dirs: u64,
    pub failed_dirs: u64,
    pub revisited_dirs: u64,
    pub indexed_files: u64,
    pub elapsed: Duration,
}

impl CrawlReport {
    fn new(root: &str, mode: CrawlMode) -> Self {
        Self {
            root: root.to_string(),
            mode,
            processed_dirs: 0,
            unchanged_dirs: 0,
            blocked_dirs: 0,
            failed_dirs: 0,
            revisited_dirs: 0,
            indexed_files: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Directories dequeued but not (re)indexed, for any reason
    pub fn skipped_dirs(&self) -> u64 {
        self.unchanged_dirs + self.blocked_dirs + self.failed_dirs + self.revisited_dirs
    }
}

/// Drives the crawl of one root against a store, a fetcher and an observer
pub struct Coordinator<'a, S: IndexStore + ?Sized> {
    store: &'a mut S,
    fetcher: &'a dyn PageFetcher,
    policy: &'a CrawlPolicy,
    observer: &'a mut dyn CrawlObserver,
    commit_interval: usize,
}

impl<'a, S: IndexStore + ?Sized> Coordinator<'a, S> {
    /// Creates a coordinator that commits every [`DEFAULT_COMMIT_INTERVAL`] directories
    pub fn new(
        store: &'a mut S,
        fetcher: &'a dyn PageFetcher,
        policy: &'a CrawlPolicy,
        observer: &'a mut dyn CrawlObserver,
    ) -> Self {
        Self {
            store,
            fetcher,
            policy,
            observer,
            commit_interval: DEFAULT_COMMIT_INTERVAL,
        }
    }

    /// Sets the number of processed directories between commits (at least 1)
    pub fn with_commit_interval(mut self, commit_interval: usize) -> Self {
        self.commit_interval = commit_interval.max(1);
        self
    }

    /// Crawls every directory reachable from `root`
    ///
    /// Fetch failures skip the directory and are reported as events. Store
    /// failures abort the crawl; writes since the last commit are left pending
    /// for the caller to roll back.
    pub async fn crawl_root(
        &mut self,
        root: &Root,
        mode: CrawlMode,
    ) -> Result<CrawlReport, IndexError> {
        let started = Instant::now();
        let mut report = CrawlReport::new(&root.url, mode);

        self.observer.on_event(&CrawlEvent::Started {
            root: root.url.clone(),
            mode,
        });

        if mode == CrawlMode::Full {
            let media_files = self.store.delete_media_for_root(&root.url)?;
            let directories = self.store.delete_directories_for_root(&root.url)?;
            self.store.commit()?;
            self.observer.on_event(&CrawlEvent::RootCleared {
                root: root.url.clone(),
                directories,
                media_files,
            });
        }

        let mut queue: VecDeque<(String, Option<String>)> = VecDeque::new();
        queue.push_back((root.url.clone(), None));
        let mut visited: HashSet<String> = HashSet::new();
        let mut since_commit = 0usize;

        while let Some((url, parent)) = queue.pop_front() {
            if !visited.insert(url.clone()) {
                report.revisited_dirs += 1;
                self.observer.on_event(&CrawlEvent::SkippedRevisit { url });
                continue;
            }

            let rel_path = path_from_root(&root.url, &url);
            if self.policy.is_blocked(&rel_path) {
                report.blocked_dirs += 1;
                self.observer.on_event(&CrawlEvent::SkippedBlocked {
                    url,
                    path: rel_path,
                });
                continue;
            }

            let page = match self.fetch_page(&url, root.cookie_file.as_deref()).await {
                Ok(page) => page,
                Err(error) => {
                    report.failed_dirs += 1;
                    self.observer
                        .on_event(&CrawlEvent::SkippedFetchFailed { url, error });
                    continue;
                }
            };

            if mode == CrawlMode::Incremental {
                if let Some(stored) = self.store.directory_freshness(&url)? {
                    if stored == page.freshness {
                        report.unchanged_dirs += 1;
                        self.observer.on_event(&CrawlEvent::SkippedUnchanged { url });
                        continue;
                    }
                }
            }

            let files = self.index_directory(root, &url, parent, &rel_path, &page)?;
            report.processed_dirs += 1;
            report.indexed_files += files as u64;

            self.observer.on_event(&CrawlEvent::DirectoryProcessed {
                url: url.clone(),
                files,
                subdirs: page.subdirs.len(),
            });

            for subdir in page.subdirs {
                queue.push_back((subdir.url, Some(url.clone())));
            }

            since_commit += 1;
            if since_commit >= self.commit_interval {
                self.store.commit()?;
                since_commit = 0;
                self.observer.on_event(&CrawlEvent::Committed {
                    processed_dirs: report.processed_dirs,
                });
            }
        }

        self.store.commit()?;
        self.observer.on_event(&CrawlEvent::Committed {
            processed_dirs: report.processed_dirs,
        });

        report.elapsed = started.elapsed();
        self.observer.on_event(&CrawlEvent::Finished {
            report: report.clone(),
        });

        Ok(report)
    }

    async fn fetch_page(
        &self,
        url: &str,
        credential: Option<&Path>,
    ) -> Result<ParsedPage, FetchError> {
        let base = Url::parse(url).map_err(|e| FetchError::Transport(e.to_string()))?;
        let html = self.fetcher.fetch(url, credential).await?;
        Ok(parse_listing(&html, &base))
    }

    /// Writes the directory row and replaces its media rows, returning the number kept
    fn index_directory(
        &mut self,
        root: &Root,
        url: &str,
        parent: Option<String>,
        rel_path: &str,
        page: &ParsedPage,
    ) -> Result<usize, IndexError> {
        self.store.upsert_directory(&DirectoryRecord {
            url: url.to_string(),
            root: root.url.clone(),
            parent,
            name: last_segment(rel_path).to_string(),
            modified: page.freshness.clone(),
        })?;

        self.store.delete_media_for_path(&root.url, rel_path)?;

        let policy = self.policy;
        let mut kept = 0;
        for file in page.files.iter().filter(|f| policy.keeps_file(&f.name)) {
            self.store.upsert_media_file(&MediaFileRecord {
                url: file.url.clone(),
                root: root.url.clone(),
                path: rel_path.to_string(),
                filename: file.name.clone(),
                modified: file.modified.clone(),
                size: file.size.clone(),
            })?;
            kept += 1;
        }

        Ok(kept)
    }
}
