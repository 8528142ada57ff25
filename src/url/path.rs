use std::borrow::Cow;

/// Computes the root-relative path of a directory URL
///
/// The result always starts with `/` and never ends with one, except for the root
/// itself which maps to `/`. A URL outside the root prefix also maps to `/`.
///
/// # Examples
///
/// ```
/// use cineindex::url::path_from_root;
///
/// assert_eq!(path_from_root("http://x/Movies/", "http://x/Movies/A/B/"), "/A/B");
/// assert_eq!(path_from_root("http://x/Movies/", "http://x/Movies/"), "/");
/// assert_eq!(path_from_root("http://x/Movies/", "http://y/Other/"), "/");
/// ```
pub fn path_from_root(root_url: &str, dir_url: &str) -> String {
    let Some(rest) = dir_url.strip_prefix(root_url) else {
        return "/".to_string();
    };

    let rel = rest.trim_end_matches('/');
    if rel.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", rel)
    }
}

/// Returns the final segment of a root-relative path, or `""` for the root
pub fn last_segment(path: &str) -> &str {
    if path == "/" {
        return "";
    }
    path.rsplit('/').next().unwrap_or("")
}

/// Percent-decodes a string, replacing invalid UTF-8 sequences
pub fn percent_decode(text: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(text.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(text),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Decodes a visible link label into an entry name
///
/// Surrounding whitespace is trimmed before percent-decoding; encoded
/// whitespace survives.
pub fn decode_name(label: &str) -> String {
    percent_decode(label.trim()).into_owned()
}
