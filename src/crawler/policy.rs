//! Crawl policy: which directories are pruned and which files are indexed
//!
//! All matching is exact and case-insensitive. Blocked directory names are
//! compared against the final segment of a directory's root-relative path only.

use crate::config::CrawlerConfig;
use crate::url::{last_segment, percent_decode};
use std::collections::HashSet;

/// Blocking and extension filtering rules for one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlPolicy {
    video_extensions: HashSet<String>,
    blocked_dirs: HashSet<String>,
}

impl CrawlPolicy {
    /// Builds a policy, lowercasing names and stripping leading dots from extensions
    pub fn new<E, B>(video_extensions: E, blocked_dirs: B) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            video_extensions: video_extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            blocked_dirs: blocked_dirs
                .into_iter()
                .map(|b| b.as_ref().trim().to_lowercase())
                .filter(|b| !b.is_empty())
                .collect(),
        }
    }

    /// Returns true if the directory at this root-relative path is pruned
    ///
    /// The final segment matches either as written in the URL or percent-decoded,
    /// so `a%20b` and `a b` in the blocked set both prune `/x/a%20b`.
    pub fn is_blocked(&self, rel_path: &str) -> bool {
        if self.blocked_dirs.is_empty() {
            return false;
        }

        let raw = last_segment(rel_path);
        self.blocked_dirs.contains(&raw.to_lowercase())
            || self
                .blocked_dirs
                .contains(&percent_decode(raw).to_lowercase())
    }

    /// Returns true if a file with this name should be indexed
    ///
    /// With an empty extension set every file is kept; otherwise the lowercase
    /// suffix after the last `.` must be in the set, and names without a `.`
    /// are dropped.
    pub fn keeps_file(&self, filename: &str) -> bool {
        if self.video_extensions.is_empty() {
            return true;
        }

        let lower = filename.to_lowercase();
        match lower.rfind('.') {
            Some(dot) => self.video_extensions.contains(&lower[dot + 1..]),
            None => false,
        }
    }

    /// Number of configured extensions
    pub fn extension_count(&self) -> usize {
        self.video_extensions.len()
    }

    /// Number of configured blocked directory names
    pub fn blocked_count(&self) -> usize {
        self.blocked_dirs.len()
    }
}

impl From<&CrawlerConfig> for CrawlPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self::new(&config.video_extensions, &config.blocked_dirs)
    }
}
