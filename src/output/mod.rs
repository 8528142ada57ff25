//! Output module for reporting on the index
//!
//! This module handles:
//! - Loading index totals and per-root counts from the database
//! - Printing statistics and recent crawl runs

pub mod stats;

pub use stats::{load_statistics, print_statistics, IndexStatistics};
