use crate::config::types::{Config, RootEntry};
use crate::url::normalize_root_url;
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use url::Url;

/// A crawl origin: canonical root URL plus the credential used to fetch it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// Canonical root URL, always ending in `/`
    pub url: String,

    /// Cookie file sent with every request below this root
    pub cookie_file: Option<PathBuf>,

    /// Short display label
    pub tag: String,
}

impl Root {
    /// Creates a root without credentials, deriving its tag from the URL
    pub fn new(url: &str) -> ConfigResult<Self> {
        let url = normalize_root_url(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", url, e)))?;
        let tag = derive_tag(&url);
        Ok(Self {
            url,
            cookie_file: None,
            tag,
        })
    }

    /// Builds a root from its configuration entry
    ///
    /// A relative cookie path is resolved against `base_dir`, and a leading `~/`
    /// against the home directory.
    pub fn from_entry(entry: &RootEntry, base_dir: &Path) -> ConfigResult<Self> {
        let mut root = Self::new(&entry.url)?;

        if let Some(tag) = entry.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            root.tag = tag.to_string();
        }

        root.cookie_file = entry
            .cookie
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| resolve_cookie_path(c, base_dir));

        Ok(root)
    }
}

impl Config {
    /// Returns the configured roots in order, normalized
    pub fn roots(&self) -> ConfigResult<Vec<Root>> {
        self.roots
            .iter()
            .map(|entry| Root::from_entry(entry, &self.base_dir))
            .collect()
    }
}

/// Derives a display tag: last path segment of the root, else its host
fn derive_tag(root_url: &str) -> String {
    let Ok(url) = Url::parse(root_url) else {
        return root_url.to_string();
    };

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| root_url.to_string())
}

fn resolve_cookie_path(raw: &str, base_dir: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(raw),
        },
        None => PathBuf::from(raw),
    };

    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}
