//! Tracing setup: full log in the XDG state dir, warnings and errors on stderr.
//!
//! Failed resources and failed pages are logged at `warn`/`error`, so the
//! stderr layer is how a user sees what was not archived. The log file keeps
//! everything `RUST_LOG` lets through (default: debug for pagekeep crates).

use anyhow::{Context, Result};
use std::fs;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info,pagekeep=debug,pagekeep_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Layer printing `WARN` and above to `make_writer`, one line per event.
pub fn warnings_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN)
}

/// Logs to `~/.local/state/pagekeep/pagekeep.log` plus warnings to stderr.
/// Returns Err when the log file cannot be opened so the caller can fall back.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagekeep")?;
    let log_file_path = xdg_dirs
        .place_state_file("pagekeep.log")
        .context("create log directory")?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open {}", log_file_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(file_layer)
        .with(warnings_layer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("pagekeep logging initialized at {}", log_file_path.display());
    Ok(())
}

/// Logs to stderr only, honouring `RUST_LOG`. Used when `init_logging` fails.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
