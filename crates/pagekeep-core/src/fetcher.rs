//! Resource fetching into the archive root.
//!
//! A resource is stored at its mapped local path. An existing file at that
//! path counts as already fetched; nothing else is cached. Failures never
//! escape: the caller gets back the original URL to keep referencing.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::css;
use crate::local_path;
use crate::transport::{Transport, TransportError};

/// Why a resource could not be stored locally.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("refusing to write outside the archive root: {0}")]
    UnsafePath(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one resource reference.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Downloaded and written to this archive-relative path.
    Fetched(String),
    /// The mapped path already existed; no request was made.
    Cached(String),
    /// Not a fetchable URL (no scheme separator); left as-is.
    Passthrough(String),
    /// Download or write failed; references keep pointing at `url`.
    Failed { url: String, error: FetchError },
}

impl FetchOutcome {
    /// The string to put back into the document: local path or original URL.
    pub fn reference(&self) -> &str {
        match self {
            FetchOutcome::Fetched(p) | FetchOutcome::Cached(p) => p,
            FetchOutcome::Passthrough(u) => u,
            FetchOutcome::Failed { url, .. } => url,
        }
    }

    /// The archive-relative path, if the resource is available locally.
    pub fn local_path(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(p) | FetchOutcome::Cached(p) => Some(p),
            FetchOutcome::Passthrough(_) | FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn into_reference(self) -> String {
        match self {
            FetchOutcome::Fetched(p) | FetchOutcome::Cached(p) => p,
            FetchOutcome::Passthrough(u) => u,
            FetchOutcome::Failed { url, .. } => url,
        }
    }
}

/// Running totals of fetch outcomes, for per-page reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
}

impl FetchStats {
    /// Outcomes recorded since `earlier` was taken.
    pub fn since(&self, earlier: &FetchStats) -> FetchStats {
        FetchStats {
            fetched: self.fetched.saturating_sub(earlier.fetched),
            cached: self.cached.saturating_sub(earlier.cached),
            failed: self.failed.saturating_sub(earlier.failed),
        }
    }
}

pub struct Fetcher<T> {
    transport: T,
    root: PathBuf,
    stats: Cell<FetchStats>,
    /// Local paths currently being downloaded; breaks stylesheet import cycles.
    in_flight: RefCell<HashSet<String>>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, root: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            root: root.into(),
            stats: Cell::new(FetchStats::default()),
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn stats(&self) -> FetchStats {
        self.stats.get()
    }

    /// Makes `url` available locally and reports where it ended up.
    ///
    /// `target` overrides the URL-derived path; stylesheets use it so relative
    /// references land next to the local copy of the stylesheet.
    pub fn fetch(&self, url: &str, target: Option<&str>) -> FetchOutcome {
        if !url.contains("://") {
            return FetchOutcome::Passthrough(url.to_string());
        }

        let local = local_path::resolve(url, target);
        if self.root.join(&local).is_file() {
            tracing::debug!(url, path = %local, "already archived, skipping");
            self.bump(|s| s.cached += 1);
            return FetchOutcome::Cached(local);
        }
        if !self.in_flight.borrow_mut().insert(local.clone()) {
            tracing::debug!(url, path = %local, "already being fetched, reusing path");
            return FetchOutcome::Cached(local);
        }

        let result = self.download(url, local.clone());
        self.in_flight.borrow_mut().remove(&local);

        match result {
            Ok(path) => {
                tracing::debug!(url, path = %path, "resource saved");
                self.bump(|s| s.fetched += 1);
                FetchOutcome::Fetched(path)
            }
            Err(error) => {
                tracing::warn!(url, "resource download failed, keeping remote URL: {}", error);
                self.bump(|s| s.failed += 1);
                FetchOutcome::Failed {
                    url: url.to_string(),
                    error,
                }
            }
        }
    }

    fn download(&self, url: &str, mut local: String) -> Result<String, FetchError> {
        if local.split('/').any(|s| s == "..") {
            return Err(FetchError::UnsafePath(local));
        }

        let body = self.transport.get(url)?;

        let mut disk = self.root.join(&local);
        if let Some(parent) = disk.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        // A directory may already sit where this file wants to go
        // (e.g. `a/b` fetched after `a/b/c`).
        while disk.is_dir() {
            local.push('_');
            disk = self.root.join(&local);
        }

        let written = if local.ends_with(".css") {
            let text = String::from_utf8_lossy(&body);
            let rewritten = css::rewrite_css(self, &text, url, &local);
            fs::write(&disk, rewritten)
        } else {
            fs::write(&disk, &body)
        };
        written.map_err(|source| FetchError::Io { path: disk, source })?;

        Ok(local)
    }

    fn bump(&self, f: impl FnOnce(&mut FetchStats)) {
        let mut s = self.stats.get();
        f(&mut s);
        self.stats.set(s);
    }
}
