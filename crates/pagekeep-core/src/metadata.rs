//! Per-page metadata record, stored as the first comment of the saved HTML.

use chrono::NaiveDateTime;
use scraper::Html;
use std::fmt;

/// First line of the metadata comment; tells it apart from ordinary comments.
pub const METADATA_SENTINEL: &str = "@@ CRAWLER METADATA @@";

/// Timestamp layout of the `last_fetch` line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time, second precision on disk.
pub type Timestamp = NaiveDateTime;

pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Host (with port, if any) the page was fetched from.
    pub site: String,
    /// Number of `<a href>` elements.
    pub num_links: usize,
    /// Number of `<img>` elements.
    pub images: usize,
    /// Local time the page was fetched.
    pub last_fetch: Timestamp,
}

impl MetadataRecord {
    /// Renders the full `<!--...-->` comment, sentinel line first.
    pub fn to_comment(&self) -> String {
        format!("<!--{}\n{}-->", METADATA_SENTINEL, self)
    }

    /// Parses the text inside a comment. `None` unless it starts with the
    /// sentinel and carries every field.
    pub fn from_comment_text(text: &str) -> Option<Self> {
        let body = text.strip_prefix(METADATA_SENTINEL)?;

        let mut site = None;
        let mut num_links = None;
        let mut images = None;
        let mut last_fetch = None;

        for line in body.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "site" => site = Some(value.to_string()),
                "num_links" => num_links = value.parse().ok(),
                "images" => images = value.parse().ok(),
                "last_fetch" => last_fetch = parse_timestamp(value),
                _ => {}
            }
        }

        Some(Self {
            site: site?,
            num_links: num_links?,
            images: images?,
            last_fetch: last_fetch?,
        })
    }

    /// Reads the record from a saved page. Only the document's first node is considered.
    pub fn from_html(html: &str) -> Option<Self> {
        let doc = Html::parse_document(html);
        let first = doc.tree.root().first_child()?;
        let comment = first.value().as_comment()?;
        Self::from_comment_text(comment)
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "site: {}", self.site)?;
        writeln!(f, "num_links: {}", self.num_links)?;
        writeln!(f, "images: {}", self.images)?;
        write!(f, "last_fetch: {}", self.last_fetch.format(TIMESTAMP_FORMAT))
    }
}
