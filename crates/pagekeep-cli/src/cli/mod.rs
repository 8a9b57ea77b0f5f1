//! CLI for the pagekeep archiver.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use pagekeep_core::config::{self, PagekeepConfig};
use std::path::PathBuf;

use commands::{run_archive, run_metadata};

/// Top-level CLI: one or more page URLs, archived in order.
#[derive(Debug, Parser)]
#[command(name = "pagekeep")]
#[command(
    about = "pagekeep: save a web page with its stylesheets, scripts and images",
    long_about = None
)]
pub struct Cli {
    /// Print the stored metadata of each URL instead of archiving it.
    #[arg(long)]
    pub metadata: bool,

    /// Archive root (overrides `output_dir` from config.toml; default: current directory).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// HTTP/HTTPS page URLs.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let root = cli.archive_root(&cfg)?;
        if cli.metadata {
            run_metadata(&cli.urls, &root);
        } else {
            std::fs::create_dir_all(&root)
                .with_context(|| format!("create archive root {}", root.display()))?;
            run_archive(&cli.urls, &root, &cfg);
        }

        Ok(())
    }

    /// Command line beats config; both unset means the current directory.
    fn archive_root(&self, cfg: &PagekeepConfig) -> Result<PathBuf> {
        match self.output_dir.as_ref().or(cfg.output_dir.as_ref()) {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

#[cfg(test)]
mod tests;
