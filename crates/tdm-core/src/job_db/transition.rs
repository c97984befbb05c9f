//! Job state machine: `PENDING → IN_PROGRESS → {COMPLETED | FAILED | CANCELLED}`.
//!
//! Every mutation of a job goes through these methods so the counter
//! invariant (`completed + failed <= total`) and the single-write terminal
//! rule hold for every record the worker persists.

use super::types::{unix_timestamp, Job, JobStatus};

/// Longest error message stored on a job, in characters.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 255;

/// Rejected job mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("illegal job transition {from} -> {to}")]
    Illegal { from: JobStatus, to: JobStatus },
    #[error("job is already {status}; no further mutation allowed")]
    Terminal { status: JobStatus },
    #[error("all {total} tracks already have an outcome")]
    CountersExceeded { total: u32 },
}

/// Truncates to at most 255 characters (252 + "...") on a char boundary.
pub fn truncate_error_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut out: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS - 3).collect();
    out.push_str("...");
    out
}

impl Job {
    fn ensure_not_terminal(&self) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal {
                status: self.status,
            });
        }
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), TransitionError> {
        self.ensure_not_terminal()?;
        if self.status != JobStatus::InProgress {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: JobStatus::InProgress,
            });
        }
        Ok(())
    }

    fn ensure_track_slot(&self) -> Result<(), TransitionError> {
        if self.processed_tracks() >= self.total_tracks {
            return Err(TransitionError::CountersExceeded {
                total: self.total_tracks,
            });
        }
        Ok(())
    }

    fn clear_activity(&mut self) {
        self.current_track_name = None;
        self.current_artist_name = None;
        self.current_file_path = None;
    }

    /// `PENDING → IN_PROGRESS`.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.ensure_not_terminal()?;
        if self.status != JobStatus::Pending {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: JobStatus::InProgress,
            });
        }
        self.status = JobStatus::InProgress;
        Ok(())
    }

    /// Marks `title` by `artist` as the track being processed and clears the previous error.
    pub fn begin_track(
        &mut self,
        artist: &str,
        title: &str,
        path: &str,
    ) -> Result<(), TransitionError> {
        self.ensure_in_progress()?;
        self.current_artist_name = Some(artist.to_string());
        self.current_track_name = Some(title.to_string());
        self.current_file_path = Some(path.to_string());
        self.last_error_message = None;
        Ok(())
    }

    pub fn record_completed(&mut self) -> Result<(), TransitionError> {
        self.ensure_in_progress()?;
        self.ensure_track_slot()?;
        self.completed_tracks += 1;
        Ok(())
    }

    pub fn record_failed(&mut self, message: &str) -> Result<(), TransitionError> {
        self.ensure_in_progress()?;
        self.ensure_track_slot()?;
        self.failed_tracks += 1;
        self.last_error_message = Some(truncate_error_message(message));
        Ok(())
    }

    /// Ends a job whose track loop ran to the end: `COMPLETED` when no track
    /// failed, otherwise `FAILED` carrying `last_failure` as its error.
    pub fn finish(&mut self, last_failure: Option<&str>) -> Result<(), TransitionError> {
        self.ensure_in_progress()?;
        self.completed_at = Some(unix_timestamp());
        self.clear_activity();
        if self.failed_tracks > 0 {
            self.status = JobStatus::Failed;
            self.last_error_message = last_failure.map(truncate_error_message);
        } else {
            self.status = JobStatus::Completed;
            self.last_error_message = None;
        }
        Ok(())
    }

    /// Forces a live job to `FAILED` after a dispatch failure.
    pub fn fail(&mut self, message: &str) -> Result<(), TransitionError> {
        self.ensure_not_terminal()?;
        self.status = JobStatus::Failed;
        self.completed_at = Some(unix_timestamp());
        self.clear_activity();
        self.last_error_message = Some(truncate_error_message(message));
        Ok(())
    }

    /// Ends a live job early after a cancellation request.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.ensure_not_terminal()?;
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(unix_timestamp());
        self.clear_activity();
        self.last_error_message = None;
        Ok(())
    }
}
