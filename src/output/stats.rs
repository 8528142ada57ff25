//! Statistics generation from the index database
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::storage::{RootSummary, RunRecord, SqliteStore};
use crate::IndexError;
use std::collections::HashMap;

/// Number of runs shown by [`print_statistics`]
pub const RECENT_RUN_LIMIT: usize = 10;

/// Index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Total number of indexed directories
    pub total_directories: u64,

    /// Total number of indexed media files
    pub total_media_files: u64,

    /// Per-root counts, sorted by root URL
    pub roots: Vec<RootSummary>,

    /// Most recent crawl runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The index database to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(IndexError)` - Failed to query statistics
pub fn load_statistics(store: &SqliteStore) -> Result<IndexStatistics, IndexError> {
    Ok(IndexStatistics {
        total_directories: store.count_directories()?,
        total_media_files: store.count_media_files()?,
        roots: store.root_summaries()?,
        recent_runs: store.recent_runs(RECENT_RUN_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `tags` - Display tags keyed by root URL; roots without one are shown by URL
pub fn print_statistics(stats: &IndexStatistics, tags: &HashMap<String, String>) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Directories: {}", stats.total_directories);
    println!("  Media files: {}", stats.total_media_files);
    println!();

    if !stats.roots.is_empty() {
        println!("Roots ({}):", stats.roots.len());
        for summary in &stats.roots {
            println!(
                "  [{}] {}: {} dirs, {} files, latest {}",
                tags.get(&summary.root).map(String::as_str).unwrap_or("-"),
                summary.root,
                summary.directories,
                summary.media_files,
                summary.latest_modified.as_deref().unwrap_or("unknown")
            );
        }
        println!();
    }

    if !stats.recent_runs.is_empty() {
        println!("Recent Runs:");
        for run in &stats.recent_runs {
            println!(
                "  #{} {} {} {} (dirs={}, skipped={}, files={})",
                run.id,
                run.started_at,
                run.mode,
                run.status.to_db_string(),
                run.dirs_processed,
                run.dirs_skipped,
                run.files_indexed
            );
        }
    }
}
