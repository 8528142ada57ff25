//! URL handling module for CineIndex
//!
//! This module provides root URL normalization, entry URL resolution, and the
//! root-relative path helpers used to key directories and media files.

mod normalize;
mod path;

// Re-export main functions
pub use normalize::{normalize_root_url, resolve_entry_url};
pub use path::{decode_name, last_segment, path_from_root, percent_decode};
