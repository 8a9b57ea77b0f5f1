//! URL to local path mapping.
//!
//! Every resource lands at a relative path derived only from its URL string
//! (or from an explicit target path), so the same URL always maps to the same
//! file and an existing file can stand in for a re-download.

mod join;
mod segment;

pub use join::{join_local, relative_to};
pub use segment::{fold_query, shorten_segment, MAX_SEGMENT_CHARS};

/// Characters replaced with `_` in resource paths.
const RESOURCE_UNSAFE: &[char] = &[':', '*', '"', '<', '>', '|', '=', '&'];

/// Characters replaced with `_` in the main page's save name.
const PAGE_UNSAFE: &[char] = &[':', '*', '?', '"', '<', '>', '|', '='];

/// True for `http://` and `https://` URLs, the only ones a page can be archived from.
pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Maps a resource URL to its local path, relative to the archive root.
///
/// Strings without a scheme separator are returned unchanged. When `target` is
/// given it replaces the URL-derived `host/path` as the base of the mapping.
///
/// # Examples
///
/// - `resolve("https://example.com/s.css", None)` → `"example.com/s.css"`
/// - `resolve("https://example.com/a.css?v=2", None)` → `"example.com/a_v_2.css"`
pub fn resolve(url: &str, target: Option<&str>) -> String {
    if !url.contains("://") {
        return url.to_string();
    }

    let base = match target {
        Some(t) => t,
        None => strip_scheme(url),
    };

    let replaced = replace_chars(base, RESOURCE_UNSAFE);
    let without_fragment = match replaced.split_once('#') {
        Some((head, _)) => head,
        None => replaced.as_str(),
    };

    let mut parts: Vec<String> = without_fragment.split('/').map(shorten_segment).collect();
    if let Some(last) = parts.last_mut() {
        *last = fold_query(last);
    }
    parts.join("/")
}

/// File name the archived page itself is written to.
///
/// Scheme prefixes are dropped and every `/` is flattened to `_`, so the page
/// always sits directly in the archive root. Queries are not folded.
pub fn page_save_name(url: &str) -> String {
    let without_scheme = url.replace("https://", "").replace("http://", "");
    let replaced = replace_chars(&without_scheme, PAGE_UNSAFE);
    format!("{}.html", replaced.replace('/', "_"))
}

fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map(|(_, rest)| rest).unwrap_or(url)
}

fn replace_chars(input: &str, unsafe_chars: &[char]) -> String {
    input
        .chars()
        .map(|c| if unsafe_chars.contains(&c) { '_' } else { c })
        .collect()
}
