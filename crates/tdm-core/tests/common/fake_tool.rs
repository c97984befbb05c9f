//! Stand-in for the external acquisition tool: a generated shell script.
//!
//! The script parses `-o <path>` like the real tool, records its arguments
//! next to the output path (`<path>.args`), then runs the given body.

use std::path::{Path, PathBuf};

/// Writes an executable script `<dir>/fake-yt-dlp` ending with `body`.
/// `$out` holds the output path inside `body`.
#[cfg(unix)]
pub fn write(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-yt-dlp");
    let script = format!(
        r#"#!/bin/sh
out=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -n "$out" ]; then printf '%s\n' "$@" > "$out.args"; fi
{body}
"#
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
