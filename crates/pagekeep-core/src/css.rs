//! `url(...)` handling inside stylesheets.
//!
//! Absolute and root-relative references are downloaded and substituted in
//! the text. Plain relative references are downloaded next to the local copy
//! of the stylesheet, so the text can stay as it is.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::fetcher::Fetcher;
use crate::local_path::{join_local, relative_to};
use crate::transport::Transport;

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(["']?([^)]*?)["']?\)"#).expect("hardcoded regex pattern is valid")
});

/// How a `url(...)` value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssRef {
    Empty,
    Data,
    Absolute,
    RootRelative,
    Relative,
}

impl CssRef {
    pub fn classify(raw: &str) -> Self {
        if raw.is_empty() {
            CssRef::Empty
        } else if raw.starts_with("data:") {
            CssRef::Data
        } else if raw.starts_with("https:") || raw.starts_with("http:") {
            CssRef::Absolute
        } else if raw.starts_with('/') {
            CssRef::RootRelative
        } else {
            CssRef::Relative
        }
    }
}

/// Every `url(...)` value in `css_text`, quotes removed, in order of appearance.
pub fn css_urls(css_text: &str) -> Vec<&str> {
    CSS_URL
        .captures_iter(css_text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Fetches everything `css_text` references and returns the rewritten text.
///
/// `css_source_url` is where the stylesheet came from (relative references are
/// fetched against it); `css_target_path` is where its local copy lives in the
/// archive. Substitution is textual over the whole stylesheet: every
/// occurrence of a matched URL string is replaced, wherever it appears.
pub fn rewrite_css<T: Transport>(
    fetcher: &Fetcher<T>,
    css_text: &str,
    css_source_url: &str,
    css_target_path: &str,
) -> String {
    let mut out = css_text.to_string();

    for raw in css_urls(css_text) {
        match CssRef::classify(raw) {
            CssRef::Empty | CssRef::Data => {}
            CssRef::Absolute => {
                let outcome = fetcher.fetch(raw, None);
                if let Some(local) = outcome.local_path() {
                    out = out.replace(raw, &relative_to(css_target_path, local));
                }
            }
            CssRef::RootRelative => {
                let Some(abs) = join_url(css_source_url, raw) else {
                    continue;
                };
                let outcome = fetcher.fetch(&abs, None);
                if let Some(local) = outcome.local_path() {
                    out = out.replace(raw, &relative_to(css_target_path, local));
                }
            }
            CssRef::Relative => {
                let Some(abs) = join_url(css_source_url, raw) else {
                    continue;
                };
                let target = join_local(css_target_path, raw);
                fetcher.fetch(&abs, Some(&target));
            }
        }
    }

    out
}

fn join_url(base: &str, reference: &str) -> Option<String> {
    match Url::parse(base).and_then(|b| b.join(reference)) {
        Ok(u) => Some(u.into()),
        Err(e) => {
            tracing::warn!(base, reference, "cannot resolve stylesheet reference: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::MapTransport;

    #[test]
    fn finds_quoted_and_bare_urls() {
        let css = r#"a{background:url("a.png")} b{background:url('b.png')} c{background:url(c.png)}"#;
        assert_eq!(css_urls(css), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn classification() {
        assert_eq!(CssRef::classify(""), CssRef::Empty);
        assert_eq!(CssRef::classify("data:image/png;base64,AAAA"), CssRef::Data);
        assert_eq!(CssRef::classify("https://cdn.example.com/f.woff"), CssRef::Absolute);
        assert_eq!(CssRef::classify("/img/a.png"), CssRef::RootRelative);
        assert_eq!(CssRef::classify("../img/a.png"), CssRef::Relative);
    }

    #[test]
    fn data_uri_is_untouched_and_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let f = Fetcher::new(MapTransport::default(), dir.path());
        let css = "i{background:url(data:image/png;base64,AAAA)}";

        let out = rewrite_css(&f, css, "https://example.com/s.css", "example.com/s.css");
        assert_eq!(out, css);
        assert_eq!(f.transport().request_count(), 0);
    }

    #[test]
    fn absolute_url_is_fetched_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let t = MapTransport::default().with("https://cdn.example.net/f.woff", "FONT");
        let f = Fetcher::new(t, dir.path());
        let css = "@font-face{src:url('https://cdn.example.net/f.woff')}";

        let out = rewrite_css(&f, css, "https://example.com/s.css", "example.com/s.css");
        assert_eq!(out, "@font-face{src:url('../cdn.example.net/f.woff')}");
        assert!(dir.path().join("cdn.example.net/f.woff").is_file());
    }

    #[test]
    fn root_relative_resolves_against_source() {
        let dir = tempfile::tempdir().unwrap();
        let t = MapTransport::default().with("https://example.com/img/a.png", "PNG");
        let f = Fetcher::new(t, dir.path());
        let css = "p{background:url(/img/a.png)}";

        let out = rewrite_css(&f, css, "https://example.com/css/s.css", "example.com/css/s.css");
        assert_eq!(out, "p{background:url(../img/a.png)}");
        assert!(dir.path().join("example.com/img/a.png").is_file());
    }

    #[test]
    fn relative_lands_next_to_local_copy_without_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let t = MapTransport::default().with("https://static.example.com/x/img/b.png", "PNG");
        let f = Fetcher::new(t, dir.path());
        let css = "p{background:url(\"img/b.png\")}";

        let out = rewrite_css(
            &f,
            css,
            "https://static.example.com/x/site.css",
            "example.com/css/site.css",
        );
        assert_eq!(out, css);
        assert!(dir.path().join("example.com/css/img/b.png").is_file());
        assert!(!dir.path().join("static.example.com").exists());
    }

    #[test]
    fn failed_fetch_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let f = Fetcher::new(MapTransport::default(), dir.path());
        let css = "p{background:url(https://example.com/gone.png)}";

        let out = rewrite_css(&f, css, "https://example.com/s.css", "example.com/s.css");
        assert_eq!(out, css);
        assert_eq!(f.transport().request_count(), 1);
    }

    #[test]
    fn substitution_applies_to_every_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let t = MapTransport::default().with("https://example.com/i.png", "PNG");
        let f = Fetcher::new(t, dir.path());
        let css = "a{background:url(/i.png)} /* see /i.png */";

        let out = rewrite_css(&f, css, "https://example.com/s.css", "example.com/s.css");
        assert_eq!(out, "a{background:url(i.png)} /* see i.png */");
    }
}
