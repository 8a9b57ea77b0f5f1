//! `pagekeep --metadata <url>...` – print what was recorded for archived pages.

use pagekeep_core::archiver::{read_metadata, ArchiveError, MetadataLookup};
use std::path::Path;

pub fn run_metadata(urls: &[String], root: &Path) {
    for url in urls {
        match read_metadata(root, url) {
            Ok(lookup) => print!("{}", format_lookup(url, &lookup)),
            Err(ArchiveError::NotHttp(_)) => {
                tracing::debug!(url = %url, "not an http(s) URL, skipped");
            }
            Err(err) => {
                tracing::error!(url = %url, "reading metadata failed: {}", err);
            }
        }
    }
}

/// `<url>:` header, the record (or a one-line reason), and a blank line.
pub(crate) fn format_lookup(url: &str, lookup: &MetadataLookup) -> String {
    let body = match lookup {
        MetadataLookup::Found(record) => record.to_string(),
        MetadataLookup::Missing => "> No metadata recorded.".to_string(),
        MetadataLookup::NotCrawled => format!("> {} has not been crawled yet.", url),
    };
    format!("{}:\n{}\n\n", url, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekeep_core::metadata::{parse_timestamp, MetadataRecord, Timestamp};

    #[test]
    fn not_crawled_message() {
        assert_eq!(
            format_lookup("https://example.com/", &MetadataLookup::NotCrawled),
            "https://example.com/:\n> https://example.com/ has not been crawled yet.\n\n"
        );
    }

    #[test]
    fn missing_message() {
        assert_eq!(
            format_lookup("https://example.com/", &MetadataLookup::Missing),
            "https://example.com/:\n> No metadata recorded.\n\n"
        );
    }

    #[test]
    fn found_prints_record_lines() {
        let record = MetadataRecord {
            site: "example.com".to_string(),
            num_links: 4,
            images: 2,
            last_fetch: timestamp(),
        };
        let out = format_lookup("https://example.com/", &MetadataLookup::Found(record));
        assert_eq!(
            out,
            "https://example.com/:\nsite: example.com\nnum_links: 4\nimages: 2\nlast_fetch: 2024-01-02 03:04:05\n\n"
        );
    }

    fn timestamp() -> Timestamp {
        parse_timestamp("2024-01-02 03:04:05").unwrap()
    }
}
