//! `pagekeep <url>...` – archive each page into the archive root.

use pagekeep_core::archiver::Archiver;
use pagekeep_core::config::PagekeepConfig;
use pagekeep_core::transport::CurlTransport;
use std::path::Path;

/// Archives every URL in order. A failing page is logged at `error` and skipped; it
/// never stops the remaining URLs or changes the exit status.
pub fn run_archive(urls: &[String], root: &Path, cfg: &PagekeepConfig) {
    let archiver = Archiver::new(CurlTransport::from_config(cfg), root);

    for url in urls {
        match archiver.archive_page(url) {
            Ok(report) => {
                println!(
                    "Archived {} -> {} ({} fetched, {} reused, {} failed)",
                    url,
                    report.saved_to.display(),
                    report.resources.fetched,
                    report.resources.cached,
                    report.resources.failed
                );
            }
            Err(err) => {
                tracing::error!(url = %url, "archive failed: {}", err);
            }
        }
    }
}
