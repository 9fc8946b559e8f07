//! Inline document metadata tags.
//!
//! Documents carry two custom tags that are not part of markdown:
//!
//! ```text
//! <!--category-- ASP.NET, PostgreSQL, Search -->
//! <datetime class="hidden">2026-01-14T12:00</datetime>
//! ```
//!
//! [`extract_metadata`] reads the first occurrence of each into a
//! [`DocumentMetadata`]. [`strip_metadata_tags`] removes every occurrence so the
//! tags never reach the display renderer.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!--\s*category\s*--\s*(.+?)\s*-->").unwrap());

static DATETIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<datetime[^>]*>([^<]+)</datetime>").unwrap());

/// Date-time layouts accepted inside `<datetime>`, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts RFC 3339 rejects, such as `2026-01-14T12:00Z`.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

/// Metadata extracted from a document's custom tags.
///
/// Both fields are empty when the document carries no tags; absence is
/// normal input, not an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentMetadata {
    /// Categories from the first `<!--category-- ... -->` tag, in written order.
    pub categories: Vec<String>,
    /// Publication date from the first `<datetime>` tag, if it parsed.
    pub publication_date: Option<NaiveDateTime>,
}

impl DocumentMetadata {
    /// Whether any metadata was found.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        !self.categories.is_empty() || self.publication_date.is_some()
    }
}

/// Extract categories and publication date from raw document text.
///
/// Only the first occurrence of each tag is honored. Never fails: a missing
/// tag or an unparsable date leaves the corresponding field empty.
#[must_use]
pub fn extract_metadata(text: &str) -> DocumentMetadata {
    DocumentMetadata {
        categories: find_categories(text).unwrap_or_default(),
        publication_date: find_publication_date(text),
    }
}

/// Remove every category and datetime tag from the text.
#[must_use]
pub fn strip_metadata_tags(text: &str) -> String {
    let without_categories = CATEGORY_RE.replace_all(text, "");
    DATETIME_RE
        .replace_all(&without_categories, "")
        .into_owned()
}

fn find_categories(text: &str) -> Option<Vec<String>> {
    let caps = CATEGORY_RE.captures(text)?;
    let categories = caps[1]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    Some(categories)
}

fn find_publication_date(text: &str) -> Option<NaiveDateTime> {
    let caps = DATETIME_RE.captures(text)?;
    let raw = caps[1].trim();
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        tracing::debug!(value = raw, "Ignoring unparsable publication date");
    }
    parsed
}

/// Parse an ISO-8601-like date or date-time.
///
/// Values with a UTC offset keep their written wall-clock time.
fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
