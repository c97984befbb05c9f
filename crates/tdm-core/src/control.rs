//! Cooperative job cancellation: shared abort tokens keyed by job id.
//!
//! The dispatcher registers each admitted job with an abort token. A cancel
//! request sets the token; the job runner checks it before starting and
//! between tracks, and ends the job as cancelled when it is set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::job_db::JobId;

/// Abort token handed to the runner of one job.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Shared registry of job id -> abort token.
#[derive(Debug, Default)]
pub struct JobControl {
    jobs: RwLock<HashMap<JobId, AbortToken>>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking holder cannot leave the map half-updated, so a poisoned
    // lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, AbortToken>> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, AbortToken>> {
        self.jobs.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an admitted job; returns the token to pass to its runner.
    pub fn register(&self, job_id: JobId) -> AbortToken {
        let token = AbortToken::default();
        self.write().insert(job_id, token.clone());
        token
    }

    /// Unregister a job (call when the job reaches a terminal state).
    pub fn unregister(&self, job_id: JobId) {
        self.write().remove(&job_id);
    }

    /// Request abort for a registered job. Returns false when the job is not
    /// registered (unknown or already finished).
    pub fn request_abort(&self, job_id: JobId) -> bool {
        match self.read().get(&job_id) {
            Some(token) => {
                token.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, job_id: JobId) -> bool {
        self.read().contains_key(&job_id)
    }
}
