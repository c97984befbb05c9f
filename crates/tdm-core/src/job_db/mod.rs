//! Persistent job store (SQLite via sqlx) and its in-memory twin.
//!
//! Stores one record per collection download: identity, owner, track
//! counters, status, and the activity fields progress pollers read.

pub mod db;
pub mod memory;
pub mod store;
pub mod transition;
pub mod types;

mod jobs {
    mod read;
    mod write;

    pub use write::INTERRUPTED_MESSAGE;
}

pub use db::JobDb;
pub use jobs::INTERRUPTED_MESSAGE;
pub use memory::MemoryJobStore;
pub use store::{JobStore, StoreError};
pub use transition::{truncate_error_message, TransitionError, MAX_ERROR_MESSAGE_CHARS};
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
impl JobStore for JobDb {
    async fn create(&self, job: &Job) -> Result<()> {
        self.insert_job(job).await
    }

    async fn save(&self, job: &Job) -> Result<()> {
        self.upsert_job(job).await
    }

    async fn find_by_job_id(&self, id: JobId) -> Result<Option<Job>> {
        self.get_job(id).await
    }

    async fn find_by_job_id_and_owner(&self, id: JobId, owner: &str) -> Result<Option<Job>> {
        self.get_owned_job(id, owner).await
    }

    async fn list_by_owner(&self, owner: &str, active_only: bool) -> Result<Vec<Job>> {
        self.list_owner_jobs(owner, active_only).await
    }
}
