//! CLI parse tests.

use super::Cli;
use clap::Parser;
use pagekeep_core::config::PagekeepConfig;
use std::path::{Path, PathBuf};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_single_url() {
    let cli = parse(&["pagekeep", "https://example.com/"]);
    assert!(!cli.metadata);
    assert!(cli.output_dir.is_none());
    assert_eq!(cli.urls, vec!["https://example.com/".to_string()]);
}

#[test]
fn cli_parse_many_urls_in_order() {
    let cli = parse(&["pagekeep", "https://a.example/", "https://b.example/x"]);
    assert_eq!(cli.urls, vec!["https://a.example/", "https://b.example/x"]);
}

#[test]
fn cli_parse_metadata_flag() {
    let cli = parse(&["pagekeep", "--metadata", "https://example.com/"]);
    assert!(cli.metadata);
    assert_eq!(cli.urls.len(), 1);
}

#[test]
fn cli_parse_output_dir() {
    let cli = parse(&["pagekeep", "-o", "/tmp/archive", "https://example.com/"]);
    assert_eq!(cli.output_dir.as_deref(), Some(Path::new("/tmp/archive")));
    let cli = parse(&["pagekeep", "--output-dir", "out", "https://example.com/"]);
    assert_eq!(cli.output_dir.as_deref(), Some(Path::new("out")));
}

#[test]
fn cli_requires_a_url() {
    assert!(Cli::try_parse_from(["pagekeep"]).is_err());
    assert!(Cli::try_parse_from(["pagekeep", "--metadata"]).is_err());
}

#[test]
fn archive_root_prefers_command_line() {
    let mut cfg = PagekeepConfig::default();
    cfg.output_dir = Some(PathBuf::from("/from/config"));

    let cli = parse(&["pagekeep", "-o", "/from/cli", "https://example.com/"]);
    assert_eq!(cli.archive_root(&cfg).unwrap(), PathBuf::from("/from/cli"));

    let cli = parse(&["pagekeep", "https://example.com/"]);
    assert_eq!(cli.archive_root(&cfg).unwrap(), PathBuf::from("/from/config"));

    let cli = parse(&["pagekeep", "https://example.com/"]);
    let cwd = std::env::current_dir().unwrap();
    assert_eq!(cli.archive_root(&PagekeepConfig::default()).unwrap(), cwd);
}
