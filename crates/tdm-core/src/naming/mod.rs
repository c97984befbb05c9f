//! Destination naming: collection directories and per-track file names.
//!
//! Names are derived deterministically from catalog metadata so a re-run of
//! the same collection finds the files a previous run already produced.

mod sanitize;

pub use sanitize::{replace_illegal_chars, strip_illegal_chars, truncate_bytes, NAME_MAX};

use std::path::{Path, PathBuf};

use crate::catalog::TrackDescriptor;
use sanitize::trim_name;

/// Directory name used when a collection has no usable display name.
const DEFAULT_DIR_NAME: &str = "download";

/// File name for one track: the title with illegal characters removed plus
/// `.{extension}`. Falls back to the track id when nothing usable remains.
pub fn track_file_name(track: &TrackDescriptor, extension: &str) -> String {
    let suffix = format!(".{extension}");
    let stripped = strip_illegal_chars(&track.title);
    let mut stem = trim_name(&stripped).to_string();
    if stem.is_empty() {
        stem = trim_name(&strip_illegal_chars(&track.id)).to_string();
    }
    if stem.is_empty() {
        stem = "track".to_string();
    }
    let stem = truncate_bytes(&stem, NAME_MAX.saturating_sub(suffix.len()));
    format!("{stem}{suffix}")
}

/// Directory name for a collection. Illegal characters become `_`; a blank
/// name becomes `download`. With `namespace`, the collection id is appended
/// so two collections sharing a display name never share a directory.
pub fn collection_dir_name(display_name: Option<&str>, collection_id: &str, namespace: bool) -> String {
    let replaced = replace_illegal_chars(display_name.unwrap_or_default());
    let base = match trim_name(&replaced) {
        "" => DEFAULT_DIR_NAME,
        name => name,
    };
    if !namespace {
        return truncate_bytes(base, NAME_MAX).to_string();
    }
    let suffix = format!(" [{}]", replace_illegal_chars(collection_id));
    let base = truncate_bytes(base, NAME_MAX.saturating_sub(suffix.len()));
    format!("{base}{suffix}")
}

/// Final path of a track inside its collection directory.
pub fn track_path(collection_dir: &Path, track: &TrackDescriptor, extension: &str) -> PathBuf {
    collection_dir.join(track_file_name(track, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn track(id: &str, title: &str) -> TrackDescriptor {
        TrackDescriptor {
            id: id.to_string(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            duration: Duration::from_secs(180),
        }
    }

    #[test]
    fn track_file_name_strips_illegal_characters() {
        assert_eq!(
            track_file_name(&track("t1", "What's Up? / Live: \"2010\""), "mp3"),
            "What's Up  Live 2010.mp3"
        );
    }

    #[test]
    fn track_file_name_falls_back_to_id() {
        assert_eq!(track_file_name(&track("t9", "???"), "mp3"), "t9.mp3");
        assert_eq!(track_file_name(&track("", "..."), "mp3"), "track.mp3");
    }

    #[test]
    fn track_file_name_fits_name_max() {
        let long = "a".repeat(400);
        let name = track_file_name(&track("t1", &long), "mp3");
        assert_eq!(name.len(), NAME_MAX);
        assert!(name.ends_with(".mp3"));
    }

    #[test]
    fn collection_dir_name_replaces_and_defaults() {
        assert_eq!(collection_dir_name(Some("Rock/Pop"), "pl1", false), "Rock_Pop");
        assert_eq!(collection_dir_name(Some("   "), "pl1", false), "download");
        assert_eq!(collection_dir_name(None, "pl1", false), "download");
    }

    #[test]
    fn collection_dir_name_namespaces_by_id() {
        assert_eq!(collection_dir_name(Some("Mix"), "abc123", true), "Mix [abc123]");
        assert_ne!(
            collection_dir_name(Some("Mix"), "abc123", true),
            collection_dir_name(Some("Mix"), "def456", true)
        );
    }

    #[test]
    fn track_path_joins_collection_dir() {
        let p = track_path(Path::new("/music/Mix [a]"), &track("t1", "Song"), "mp3");
        assert_eq!(p, PathBuf::from("/music/Mix [a]/Song.mp3"));
    }
}
