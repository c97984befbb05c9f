//! In-process job store with the same write rules as the SQLite store.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::store::{check_overwrite, JobStore, StoreError};
use super::types::{Job, JobId};

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, (u64, Job)>,
    next_seq: u64,
}

/// Job store backed by a `HashMap` behind a tokio `RwLock`.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: RwLock<Inner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &Job) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.jobs.contains_key(&job.id) {
            return Err(StoreError::Duplicate(job.id).into());
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(job.id, (seq, job.clone()));
        Ok(())
    }

    async fn save(&self, job: &Job) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some((_, existing)) = inner.jobs.get_mut(&job.id) {
            check_overwrite(existing, job)?;
            *existing = job.clone();
            return Ok(());
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(job.id, (seq, job.clone()));
        Ok(())
    }

    async fn find_by_job_id(&self, id: JobId) -> Result<Option<Job>> {
        Ok(self.inner.read().await.jobs.get(&id).map(|(_, j)| j.clone()))
    }

    async fn find_by_job_id_and_owner(&self, id: JobId, owner: &str) -> Result<Option<Job>> {
        Ok(self
            .inner
            .read()
            .await
            .jobs
            .get(&id)
            .filter(|(_, j)| j.owner == owner)
            .map(|(_, j)| j.clone()))
    }

    async fn list_by_owner(&self, owner: &str, active_only: bool) -> Result<Vec<Job>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<&(u64, Job)> = inner
            .jobs
            .values()
            .filter(|(_, j)| j.owner == owner)
            .filter(|(_, j)| !active_only || j.status.is_active())
            .collect();
        rows.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        Ok(rows.into_iter().map(|(_, j)| j.clone()).collect())
    }
}
