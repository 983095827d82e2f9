//! Content items and metadata parsing.
//!
//! Two metadata styles exist in the tree: structured JSON documents and an
//! older line-prefixed `key: value` format. One parser detects the format
//! and produces the same [`RawMetadata`] either way. Parsing never fails an
//! item's existence: a malformed document degrades to defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of content an item renders as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Markdown body rendered in place
    #[default]
    Md,

    /// Embedded PDF viewer
    Pdf,

    /// Embedded video player
    Video,

    /// External navigation, body never fetched
    Link,

    /// Embedded marimo notebook
    Marimo,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Md => write!(f, "md"),
            ContentKind::Pdf => write!(f, "pdf"),
            ContentKind::Video => write!(f, "video"),
            ContentKind::Link => write!(f, "link"),
            ContentKind::Marimo => write!(f, "marimo"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "md" | "markdown" => Ok(ContentKind::Md),
            "pdf" => Ok(ContentKind::Pdf),
            "video" => Ok(ContentKind::Video),
            "link" => Ok(ContentKind::Link),
            "marimo" => Ok(ContentKind::Marimo),
            _ => anyhow::bail!("Unknown content kind: {}", s),
        }
    }
}

impl ContentKind {
    /// Whether the markdown body should be fetched for rendering
    pub fn needs_body(&self) -> bool {
        matches!(self, ContentKind::Md)
    }

    /// Whether the item is shown through an embedded external viewer
    pub fn uses_viewer(&self) -> bool {
        matches!(self, ContentKind::Pdf | ContentKind::Video | ContentKind::Marimo)
    }
}

/// Category field as it appears in metadata: a delimited string or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Categories {
    One(String),
    Many(Vec<String>),
}

/// Metadata document as written by contributors. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadata {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub categories: Option<Categories>,
    pub link: Option<String>,
    pub url: Option<String>,
    pub id: Option<String>,
}

/// A normalized content record
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    /// Logical id (markdown file basename without extension)
    pub id: String,

    /// Path of the markdown body within the tree
    pub path: String,

    /// Display title (defaults to the id)
    pub title: String,

    /// Author line (defaults to empty)
    pub authors: String,

    /// Publication date, if it parsed
    pub date: Option<NaiveDate>,

    /// Short summary (defaults to empty)
    pub summary: String,

    /// How the item renders
    pub kind: ContentKind,

    /// Normalized category tags, deduplicated, source order preserved
    pub categories: Vec<String>,

    /// Cover image path, if any
    pub image: Option<String>,

    /// Navigation target or embedded viewer reference, for non-md kinds
    pub external_url: Option<String>,

    /// Markdown body, fetched lazily and only for md items
    pub body: Option<String>,
}

impl ContentItem {
    /// Build an item from (possibly absent) metadata, applying defaults
    pub fn from_metadata(id: &str, path: &str, meta: RawMetadata) -> Self {
        let kind = meta
            .kind
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            id: id.to_string(),
            path: path.to_string(),
            title: meta.title.unwrap_or_else(|| id.to_string()),
            authors: meta.authors.unwrap_or_default(),
            date: meta.date.as_deref().and_then(parse_date),
            summary: meta.summary.unwrap_or_default(),
            kind,
            categories: normalize_categories(meta.categories),
            image: meta.image,
            external_url: meta.link.or(meta.url),
            body: None,
        }
    }
}

/// Parse a metadata document, detecting the format first.
///
/// Returns `None` when the document is recognizably neither format; the
/// caller treats that the same as "no metadata found".
pub fn parse_metadata(text: &str) -> Option<RawMetadata> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).ok();
    }

    parse_line_prefixed(trimmed)
}

/// Older `key: value` metadata format, one field per line
fn parse_line_prefixed(text: &str) -> Option<RawMetadata> {
    let mut meta = RawMetadata::default();
    let mut recognized = false;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let value = value.to_string();

        match key.trim().to_lowercase().as_str() {
            "title" => meta.title = Some(value),
            "authors" | "author" => meta.authors = Some(value),
            "date" => meta.date = Some(value),
            "summary" => meta.summary = Some(value),
            "type" | "kind" => meta.kind = Some(value),
            "image" => meta.image = Some(value),
            "categories" | "category" | "tags" => {
                meta.categories = Some(Categories::One(value))
            }
            "link" => meta.link = Some(value),
            "url" => meta.url = Some(value),
            "id" => meta.id = Some(value),
            _ => continue,
        }
        recognized = true;
    }

    if recognized {
        Some(meta)
    } else {
        None
    }
}

/// Normalize categories from either source encoding into a trimmed,
/// deduplicated, order-preserving list.
pub fn normalize_categories(categories: Option<Categories>) -> Vec<String> {
    let parts: Vec<String> = match categories {
        None => return Vec::new(),
        Some(Categories::One(s)) => s
            .split([',', ';'])
            .map(|p| p.trim().to_string())
            .collect(),
        Some(Categories::Many(list)) => list
            .into_iter()
            .flat_map(|s| {
                s.split([',', ';'])
                    .map(|p| p.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .collect(),
    };

    let mut seen = Vec::new();
    for part in parts {
        if !part.is_empty() && !seen.contains(&part) {
            seen.push(part);
        }
    }
    seen
}

/// Parse a contributor-supplied date string.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and RFC 3339 timestamps. Anything
/// else is treated as undated.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
