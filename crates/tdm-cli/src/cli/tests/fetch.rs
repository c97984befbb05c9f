//! Tests for the fetch subcommand.

use super::parse;
use crate::cli::{resolve_owner, CliCommand};

#[test]
fn cli_parse_fetch() {
    match parse(&["tdm", "fetch", "playlist:37i9dQZF1DXcBWIGoYBM5M"]) {
        CliCommand::Fetch {
            reference,
            owner,
            download_dir,
        } => {
            assert_eq!(reference, "playlist:37i9dQZF1DXcBWIGoYBM5M");
            assert!(owner.is_none());
            assert!(download_dir.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_owner_and_download_dir() {
    match parse(&[
        "tdm",
        "fetch",
        "https://open.example.com/album/4m2880jivSbbyEGAKfITCa?si=x",
        "--owner",
        "alice",
        "--download-dir",
        "/srv/music",
    ]) {
        CliCommand::Fetch {
            reference,
            owner,
            download_dir,
        } => {
            assert!(reference.starts_with("https://"));
            assert_eq!(owner.as_deref(), Some("alice"));
            assert_eq!(download_dir.as_deref(), Some(std::path::Path::new("/srv/music")));
        }
        _ => panic!("expected Fetch with options"),
    }
}

#[test]
fn cli_parse_fetch_requires_reference() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["tdm", "fetch"]).is_err());
}

#[test]
fn explicit_owner_wins() {
    assert_eq!(resolve_owner(Some("bob".into())), "bob");
}
