//! CLI command handlers. Each command is in its own file.

mod fetch;
mod list;
mod status;

pub use fetch::run_fetch;
pub use list::run_list;
pub use status::run_status;

use tdm_core::dispatch::ProgressSnapshot;

/// One-line progress summary, e.g. `IN_PROGRESS 3/10 done, 1 failed (30%) Daft Punk - Aerodynamic`.
pub(crate) fn progress_line(snap: &ProgressSnapshot) -> String {
    let mut line = format!(
        "{} {}/{} done, {} failed ({:.0}%)",
        snap.status,
        snap.completed_tracks,
        snap.total_tracks,
        snap.failed_tracks,
        snap.progress_percentage
    );
    match (&snap.current_artist, &snap.current_track) {
        (Some(artist), Some(track)) if !artist.is_empty() => {
            line.push_str(&format!(" {artist} - {track}"))
        }
        (_, Some(track)) => line.push_str(&format!(" {track}")),
        _ => {}
    }
    line
}
