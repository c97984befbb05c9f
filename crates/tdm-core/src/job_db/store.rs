//! Job store port: the durable owner of job records, injected into the dispatcher.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{Job, JobId, JobStatus};

/// Store-level rejection of a write (wrapped in `anyhow::Error`; use `downcast_ref`).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    Duplicate(JobId),
    #[error("job {id} is {status}; terminal records are never overwritten")]
    Terminal { id: JobId, status: JobStatus },
    #[error("job {0}: counters may not decrease")]
    CounterRegression(JobId),
}

/// Whole-record job persistence. Reads must observe the most recent committed `save`.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new record; fails with [`StoreError::Duplicate`] if the id exists.
    async fn create(&self, job: &Job) -> Result<()>;

    /// Upsert by job id. Rejects overwriting a terminal record or decreasing a counter.
    async fn save(&self, job: &Job) -> Result<()>;

    async fn find_by_job_id(&self, id: JobId) -> Result<Option<Job>>;

    /// Owner-scoped lookup; a job owned by someone else is reported as absent.
    async fn find_by_job_id_and_owner(&self, id: JobId, owner: &str) -> Result<Option<Job>>;

    /// The owner's jobs, newest first. `active_only` keeps `PENDING`/`IN_PROGRESS`.
    async fn list_by_owner(&self, owner: &str, active_only: bool) -> Result<Vec<Job>>;
}

/// Checks an incoming whole-record write against the stored record.
pub(crate) fn check_overwrite(existing: &Job, incoming: &Job) -> Result<(), StoreError> {
    if existing.status.is_terminal() {
        return Err(StoreError::Terminal {
            id: existing.id,
            status: existing.status,
        });
    }
    if incoming.completed_tracks < existing.completed_tracks
        || incoming.failed_tracks < existing.failed_tracks
    {
        return Err(StoreError::CounterRegression(existing.id));
    }
    Ok(())
}
