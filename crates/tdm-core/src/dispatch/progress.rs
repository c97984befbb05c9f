//! Client-facing progress projection of a job record.

use serde::Serialize;

use crate::catalog::CollectionKind;
use crate::job_db::{Job, JobId, JobStatus};

/// Read-only view of one job, computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub job_id: JobId,
    pub display_name: Option<String>,
    pub collection_kind: CollectionKind,
    pub collection_id: String,
    pub total_tracks: u32,
    pub completed_tracks: u32,
    pub failed_tracks: u32,
    pub status: JobStatus,
    pub current_track: Option<String>,
    pub current_artist: Option<String>,
    pub current_file_path: Option<String>,
    /// `100 * completed / total`; 0.0 for an empty collection.
    pub progress_percentage: f64,
    pub error_message: Option<String>,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl ProgressSnapshot {
    pub fn project(job: &Job) -> Self {
        let progress_percentage = if job.total_tracks == 0 {
            0.0
        } else {
            100.0 * f64::from(job.completed_tracks) / f64::from(job.total_tracks)
        };
        Self {
            job_id: job.id,
            display_name: job.display_name.clone(),
            collection_kind: job.collection_kind,
            collection_id: job.collection_id.clone(),
            total_tracks: job.total_tracks,
            completed_tracks: job.completed_tracks,
            failed_tracks: job.failed_tracks,
            status: job.status,
            current_track: job.current_track_name.clone(),
            current_artist: job.current_artist_name.clone(),
            current_file_path: job.current_file_path.clone(),
            progress_percentage,
            error_message: job.last_error_message.clone(),
            created_at: job.created_at,
            completed_at: job.completed_at,
        }
    }
}

impl From<&Job> for ProgressSnapshot {
    fn from(job: &Job) -> Self {
        Self::project(job)
    }
}
