//! Single-page archiving.
//!
//! One pass over the fetched HTML: stylesheet/icon links, scripts and images
//! are fetched and their attributes pointed at the local copies, inline
//! `<style>` blocks have their `url(...)` targets fetched (the block text is
//! left alone), and `crossorigin` is stripped from tags that would otherwise
//! fail to load from disk. The page is written with a metadata comment in
//! front of everything else.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::SubsecRound;
use lol_html::errors::{AttributeNameError, RewritingError};
use lol_html::html_content::Element;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use url::Url;

use crate::css;
use crate::fetcher::{FetchStats, Fetcher};
use crate::local_path::{is_http_url, page_save_name};
use crate::metadata::MetadataRecord;
use crate::transport::{Transport, TransportError};

/// Tags whose `crossorigin` attribute is removed.
const CROSSORIGIN_TAGS: &[&str] = &["script", "img", "audio", "video", "link"];

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("not an http(s) URL: {0}")]
    NotHttp(String),
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("fetching page failed: {0}")]
    Transport(#[from] TransportError),
    #[error("rewriting page failed: {0}")]
    Rewrite(#[from] RewritingError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Summary of one successful archive run.
#[derive(Debug, Clone)]
pub struct PageReport {
    /// Where the page was written.
    pub saved_to: PathBuf,
    pub metadata: MetadataRecord,
    /// Resource outcomes during this page only.
    pub resources: FetchStats,
}

/// Result of looking up a page's metadata in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataLookup {
    /// No saved page for this URL.
    NotCrawled,
    /// A saved page exists but does not start with a metadata comment.
    Missing,
    Found(MetadataRecord),
}

pub struct Archiver<T> {
    fetcher: Fetcher<T>,
}

impl<T: Transport> Archiver<T> {
    pub fn new(transport: T, root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher: Fetcher::new(transport, root),
        }
    }

    pub fn root(&self) -> &Path {
        self.fetcher.root()
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Archives `url` into the root directory.
    ///
    /// Resource failures only degrade the result (the remote URL is kept).
    /// Any error returned here means the page file was not written; resources
    /// fetched before the failure stay on disk.
    pub fn archive_page(&self, url: &str) -> Result<PageReport, ArchiveError> {
        if !is_http_url(url) {
            return Err(ArchiveError::NotHttp(url.to_string()));
        }
        let page_url = Url::parse(url).map_err(|source| ArchiveError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let save_name = page_save_name(url);
        let before = self.fetcher.stats();

        tracing::info!(url, "archiving page");
        let body = self.fetcher.transport().get(url)?;
        let html = String::from_utf8_lossy(&body);

        let links = Cell::new(0usize);
        let images = Cell::new(0usize);
        let mut style_text = String::new();

        let rewritten = rewrite_str(
            &html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("a[href]", |_el| {
                        links.set(links.get() + 1);
                        Ok(())
                    }),
                    element!("link[href]", |el| {
                        let rel = el.get_attribute("rel").unwrap_or_default();
                        let wanted = rel.split_ascii_whitespace().any(|r| {
                            r.eq_ignore_ascii_case("stylesheet") || r.eq_ignore_ascii_case("icon")
                        });
                        if wanted {
                            self.localize_attribute(el, "href", &page_url)?;
                        }
                        Ok(())
                    }),
                    element!("script[src]", |el| {
                        self.localize_attribute(el, "src", &page_url)?;
                        Ok(())
                    }),
                    text!("style", |chunk| {
                        style_text.push_str(chunk.as_str());
                        if chunk.last_in_text_node() {
                            css::rewrite_css(&self.fetcher, &style_text, url, &save_name);
                            style_text.clear();
                        }
                        Ok(())
                    }),
                    element!("img", |el| {
                        images.set(images.get() + 1);
                        self.localize_attribute(el, "src", &page_url)?;
                        if let Some(srcset) = el.get_attribute("srcset") {
                            el.set_attribute("srcset", &self.localize_srcset(&srcset, &page_url))?;
                        }
                        Ok(())
                    }),
                    element!("[crossorigin]", |el| {
                        let tag = el.tag_name();
                        if CROSSORIGIN_TAGS.contains(&tag.as_str()) {
                            el.remove_attribute("crossorigin");
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )?;

        let metadata = MetadataRecord {
            site: site_of(&page_url),
            num_links: links.get(),
            images: images.get(),
            last_fetch: chrono::Local::now().naive_local().trunc_subsecs(0),
        };

        let root = self.root();
        fs::create_dir_all(root).map_err(|source| ArchiveError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let saved_to = root.join(&save_name);
        fs::write(&saved_to, format!("{}{}", metadata.to_comment(), rewritten)).map_err(
            |source| ArchiveError::Io {
                path: saved_to.clone(),
                source,
            },
        )?;

        let resources = self.fetcher.stats().since(&before);
        tracing::info!(
            url,
            path = %saved_to.display(),
            fetched = resources.fetched,
            cached = resources.cached,
            failed = resources.failed,
            "page archived"
        );

        Ok(PageReport {
            saved_to,
            metadata,
            resources,
        })
    }

    /// Reads the metadata of a previously archived page.
    pub fn read_metadata(&self, url: &str) -> Result<MetadataLookup, ArchiveError> {
        read_metadata(self.root(), url)
    }

    /// Rewrites `attr` to the local copy of what it references, if present.
    fn localize_attribute(
        &self,
        el: &mut Element<'_, '_>,
        attr: &str,
        page_url: &Url,
    ) -> Result<(), AttributeNameError> {
        let Some(value) = el.get_attribute(attr) else {
            return Ok(());
        };
        let reference = self.localize(page_url, &value);
        el.set_attribute(attr, &reference)
    }

    /// Keeps only two-token `url descriptor` entries, each pointed at its local
    /// copy and written back as `url, descriptor`.
    fn localize_srcset(&self, srcset: &str, page_url: &Url) -> String {
        srcset
            .split(',')
            .filter_map(|entry| {
                let tokens: Vec<&str> = entry.split_whitespace().collect();
                match tokens.as_slice() {
                    [src, descriptor] => {
                        Some(format!("{}, {}", self.localize(page_url, src), descriptor))
                    }
                    _ => {
                        tracing::debug!(entry = entry.trim(), "dropping malformed srcset entry");
                        None
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn localize(&self, page_url: &Url, reference: &str) -> String {
        if reference.starts_with("data:") {
            return reference.to_string();
        }
        match page_url.join(reference) {
            Ok(abs) => self.fetcher.fetch(abs.as_str(), None).into_reference(),
            Err(e) => {
                tracing::warn!(reference, "cannot resolve against page URL: {}", e);
                reference.to_string()
            }
        }
    }
}

/// Looks up the metadata of the page archived for `url` under `root`.
pub fn read_metadata(root: &Path, url: &str) -> Result<MetadataLookup, ArchiveError> {
    if !is_http_url(url) {
        return Err(ArchiveError::NotHttp(url.to_string()));
    }
    let path = root.join(page_save_name(url));
    if !path.is_file() {
        return Ok(MetadataLookup::NotCrawled);
    }
    let html = fs::read_to_string(&path).map_err(|source| ArchiveError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(match MetadataRecord::from_html(&html) {
        Some(record) => MetadataLookup::Found(record),
        None => MetadataLookup::Missing,
    })
}

/// `host[:port]` as written in the metadata `site:` line.
fn site_of(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
