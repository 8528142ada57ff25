//! Directory listing parser
//!
//! This module sniffs which listing format a page uses and extracts its entries:
//! - h5ai pages, through the `div#fallback` table rendered for non-JS clients
//! - DataTables listings (`table#example`)
//! - Plain autoindex tables (Apache/nginx style), used when nothing else matches
//!
//! All three share one output contract, [`ParsedPage`]. Parsing never fails: a page
//! without a recognizable table yields an empty result.

use crate::url::{decode_name, resolve_entry_url};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A subdirectory listed on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub url: String,
    pub modified: Option<String>,
}

/// A file listed on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub url: String,
    pub modified: Option<String>,
    pub size: Option<String>,
}

/// Extracted information from a directory listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Maximum, by plain string comparison, of the modified cells of all entries
    pub freshness: Option<String>,

    /// Subdirectories, in page order
    pub subdirs: Vec<DirEntry>,

    /// Files, in page order
    pub files: Vec<FileEntry>,
}

impl ParsedPage {
    /// Returns true if the page produced no entries at all
    pub fn is_empty(&self) -> bool {
        self.subdirs.is_empty() && self.files.is_empty()
    }
}

/// Listing formats, in detection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// h5ai's `div#fallback` table: icon, name, modified, size
    H5ai,
    /// DataTables listing: icon, name, (unused), size, modified
    DataTable,
    /// First table on the page: icon, name, modified, size
    Autoindex,
}

const DETECTION_ORDER: [ListingKind; 3] = [
    ListingKind::H5ai,
    ListingKind::DataTable,
    ListingKind::Autoindex,
];

/// How a row with a link is classified as a subdirectory
#[derive(Debug, Clone, Copy)]
enum SubdirRule {
    /// href ends with `/`, or the icon says folder
    SlashOrFolderIcon,
    /// href ends with `/` and the size cell is empty
    SlashWithoutSize,
}

/// Column positions for one listing format
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    min_cells: usize,
    modified: Option<usize>,
    size: Option<usize>,
    subdir_rule: SubdirRule,
}

impl ListingKind {
    /// CSS selector whose presence identifies this format
    fn marker(self) -> &'static str {
        match self {
            Self::H5ai => "div#fallback",
            Self::DataTable => "table#example",
            Self::Autoindex => "table",
        }
    }

    fn layout(self) -> ColumnLayout {
        match self {
            Self::H5ai => ColumnLayout {
                min_cells: 4,
                modified: Some(2),
                size: Some(3),
                subdir_rule: SubdirRule::SlashOrFolderIcon,
            },
            Self::DataTable => ColumnLayout {
                min_cells: 2,
                modified: Some(4),
                size: Some(3),
                subdir_rule: SubdirRule::SlashWithoutSize,
            },
            Self::Autoindex => ColumnLayout {
                min_cells: 2,
                modified: Some(2),
                size: Some(3),
                subdir_rule: SubdirRule::SlashOrFolderIcon,
            },
        }
    }

    /// Finds the element whose `tr` descendants are the listing rows
    fn row_container(self, document: &Html) -> Option<ElementRef<'_>> {
        let marker = first_match(document.root_element(), self.marker())?;

        match self {
            Self::H5ai => first_match(marker, "table"),
            Self::DataTable => first_match(marker, "tbody").or(Some(marker)),
            Self::Autoindex => Some(marker),
        }
    }
}

/// Detects which listing format a parsed document uses
///
/// Formats are tried in priority order and the first whose marker is present wins.
/// Pages matching nothing are treated as autoindex pages.
pub fn detect_listing(document: &Html) -> ListingKind {
    DETECTION_ORDER
        .into_iter()
        .find(|kind| first_match(document.root_element(), kind.marker()).is_some())
        .unwrap_or(ListingKind::Autoindex)
}

/// Parses a directory listing page
///
/// # Arguments
///
/// * `html` - The page body
/// * `base_url` - The URL the page was fetched from; entry hrefs resolve against it
///
/// # Returns
///
/// The extracted entries and freshness token. Unrecognized pages produce an
/// empty [`ParsedPage`].
///
/// # Example
///
/// ```
/// use cineindex::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<table>
///   <tr><td></td><td><a href="A/">A/</a></td><td>2024-01-01</td><td>-</td></tr>
///   <tr><td></td><td><a href="b.mkv">b.mkv</a></td><td>2023-12-31</td><td>700M</td></tr>
/// </table>"#;
/// let base_url = Url::parse("http://x/Movies/").unwrap();
/// let parsed = parse_listing(html, &base_url);
/// assert_eq!(parsed.subdirs[0].url, "http://x/Movies/A/");
/// assert_eq!(parsed.files[0].size.as_deref(), Some("700M"));
/// assert_eq!(parsed.freshness.as_deref(), Some("2024-01-01"));
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let kind = detect_listing(&document);

    match kind.row_container(&document) {
        Some(container) => parse_rows(container, kind.layout(), base_url),
        None => ParsedPage::default(),
    }
}

/// One accepted listing row
enum ListingEntry {
    Dir(DirEntry),
    File(FileEntry),
}

fn parse_rows(container: ElementRef<'_>, layout: ColumnLayout, base_url: &Url) -> ParsedPage {
    let mut page = ParsedPage::default();

    let (Some(row_selector), Some(cell_selector)) = (selector("tr"), selector("td")) else {
        return page;
    };

    for row in container.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();

        let Some(entry) = parse_row(&cells, layout, base_url) else {
            continue;
        };

        match entry {
            ListingEntry::Dir(dir) => {
                bump_freshness(&mut page.freshness, dir.modified.as_deref());
                page.subdirs.push(dir);
            }
            ListingEntry::File(file) => {
                bump_freshness(&mut page.freshness, file.modified.as_deref());
                page.files.push(file);
            }
        }
    }

    page
}

fn parse_row(cells: &[ElementRef<'_>], layout: ColumnLayout, base_url: &Url) -> Option<ListingEntry> {
    if cells.len() < layout.min_cells {
        return None;
    }

    let link = first_match(cells[1], "a")?;
    let href = link.value().attr("href").unwrap_or("");
    let label: String = link.text().collect();
    let alt = first_match(cells[0], "img")
        .and_then(|img| img.value().attr("alt"))
        .unwrap_or("");

    if is_parent_row(alt, href, &label) {
        return None;
    }

    let modified = layout
        .modified
        .and_then(|i| cells.get(i))
        .and_then(|cell| cell_text(*cell));
    let size = layout
        .size
        .and_then(|i| cells.get(i))
        .and_then(|cell| cell_text(*cell));

    let url = resolve_entry_url(base_url, href)?;
    let name = decode_name(&label);

    let is_dir = match layout.subdir_rule {
        SubdirRule::SlashOrFolderIcon => href.ends_with('/') || is_folder_icon(alt),
        SubdirRule::SlashWithoutSize => href.ends_with('/') && size.is_none(),
    };

    Some(if is_dir {
        ListingEntry::Dir(DirEntry {
            name,
            url,
            modified,
        })
    } else {
        ListingEntry::File(FileEntry {
            name,
            url,
            modified,
            size,
        })
    })
}

/// Parent-directory rows are never entries, whatever the format
fn is_parent_row(alt: &str, href: &str, label: &str) -> bool {
    alt.to_uppercase().starts_with("[PARENTDIR]")
        || href == ".."
        || href == "../"
        || label.contains("Parent Directory")
}

fn is_folder_icon(alt: &str) -> bool {
    alt.to_uppercase().contains("[DIR]") || alt.to_lowercase().contains("folder")
}

/// Text of a cell with each text node trimmed; `None` when nothing remains
fn cell_text(cell: ElementRef<'_>) -> Option<String> {
    let text: String = cell.text().map(str::trim).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn bump_freshness(current: &mut Option<String>, modified: Option<&str>) {
    let Some(modified) = modified else {
        return;
    };

    if current.as_deref().map_or(true, |token| modified > token) {
        *current = Some(modified.to_string());
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_match<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    let found = element.select(&selector).next();
    found
}
