use url::Url;

/// Normalizes a root URL so it always ends with exactly one trailing slash
///
/// Root URLs are used as string prefixes when computing root-relative paths,
/// so `http://host/Movies`, `http://host/Movies/` and `http://host/Movies//`
/// must all collapse to the same canonical form. The fragment, if any, is dropped.
///
/// # Arguments
///
/// * `url_str` - The root URL as written in the configuration
///
/// # Returns
///
/// * `Ok(String)` - Canonical root URL ending in `/`
/// * `Err(url::ParseError)` - The URL could not be parsed
///
/// # Examples
///
/// ```
/// use cineindex::url::normalize_root_url;
///
/// let root = normalize_root_url("http://example.com/Movies").unwrap();
/// assert_eq!(root, "http://example.com/Movies/");
/// ```
pub fn normalize_root_url(url_str: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(url_str.trim())?;
    url.set_fragment(None);

    Ok(format!("{}/", url.as_str().trim_end_matches('/')))
}

/// Resolves a listing entry's href against the page URL and strips the fragment
///
/// Returns `None` when the href cannot be resolved, in which case the entry is
/// dropped by the parser.
///
/// # Examples
///
/// ```
/// use cineindex::url::resolve_entry_url;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/Movies/").unwrap();
/// assert_eq!(
///     resolve_entry_url(&base, "A%20B/#top").as_deref(),
///     Some("http://example.com/Movies/A%20B/")
/// );
/// ```
pub fn resolve_entry_url(base_url: &Url, href: &str) -> Option<String> {
    let mut url = base_url.join(href).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}
