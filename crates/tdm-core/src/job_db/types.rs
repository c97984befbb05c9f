//! Types used by the job store.

use serde::{Deserialize, Serialize};

use crate::catalog::CollectionKind;

/// Job identifier (random UUID v4, never reused).
pub type JobId = uuid::Uuid;

/// Identifier of the principal that submitted a job.
pub type OwnerId = String;

/// Job status stored as a string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses a stored status. Unknown strings map to `Failed` so a corrupt row never looks runnable.
    pub fn from_str(s: &str) -> Self {
        match s {
            "PENDING" => JobStatus::Pending,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            "CANCELLED" => JobStatus::Cancelled,
            _ => JobStatus::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Full job record. The worker holds a working copy and re-persists it
/// after every meaningful mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub owner: OwnerId,
    pub collection_kind: CollectionKind,
    pub collection_id: String,
    pub display_name: Option<String>,
    pub total_tracks: u32,
    pub completed_tracks: u32,
    pub failed_tracks: u32,
    pub status: JobStatus,
    pub current_track_name: Option<String>,
    pub current_artist_name: Option<String>,
    pub current_file_path: Option<String>,
    pub last_error_message: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds, set once at the terminal transition.
    pub completed_at: Option<i64>,
}

impl Job {
    /// New `PENDING` job with zeroed counters and a fresh id.
    pub fn new(
        owner: impl Into<OwnerId>,
        collection_kind: CollectionKind,
        collection_id: impl Into<String>,
        display_name: Option<String>,
        total_tracks: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            owner: owner.into(),
            collection_kind,
            collection_id: collection_id.into(),
            display_name,
            total_tracks,
            completed_tracks: 0,
            failed_tracks: 0,
            status: JobStatus::Pending,
            current_track_name: None,
            current_artist_name: None,
            current_file_path: None,
            last_error_message: None,
            created_at: unix_timestamp(),
            completed_at: None,
        }
    }

    /// Tracks with a recorded outcome (completed or failed).
    pub fn processed_tracks(&self) -> u32 {
        self.completed_tracks + self.failed_tracks
    }
}

/// Current time as Unix seconds.
pub fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
