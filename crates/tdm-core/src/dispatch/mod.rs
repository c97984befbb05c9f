//! Job dispatcher: admits collection downloads, runs them on a bounded
//! worker pool, and serves owner-scoped progress reads.
//!
//! `submit` resolves the collection and persists a `PENDING` job before
//! returning; a worker then drives the job to a terminal state. At most
//! `worker_count + queue_capacity` jobs are admitted and unfinished at a
//! time; beyond that `submit` fails with [`DispatchError::CapacityExceeded`].

mod error;
mod pool;
mod process;
mod progress;
mod run;

pub use error::DispatchError;
pub use process::{TrackOutcome, TrackProcessor};
pub use progress::ProgressSnapshot;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore, TryAcquireError};
use tokio::task::JoinHandle;

use crate::acquire::Acquirer;
use crate::catalog::{Catalog, CollectionRef};
use crate::config::TdmConfig;
use crate::control::JobControl;
use crate::job_db::{Job, JobId, JobStore};

use pool::QueuedJob;

/// Collaborators injected into the dispatcher.
#[derive(Clone)]
pub struct DispatchDeps {
    pub catalog: Arc<dyn Catalog>,
    pub acquirer: Arc<dyn Acquirer>,
    pub store: Arc<dyn JobStore>,
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Jobs processed concurrently (at least 1).
    pub worker_count: usize,
    /// Admitted jobs allowed to wait for a free worker.
    pub queue_capacity: usize,
    /// Base directory; each collection gets its own subdirectory.
    pub download_dir: PathBuf,
    pub namespace_dirs: bool,
    /// Track file extension, matching the requested audio format.
    pub audio_extension: String,
}

impl DispatchSettings {
    pub fn from_config(cfg: &TdmConfig, download_dir: PathBuf) -> Self {
        Self {
            worker_count: cfg.worker_count,
            queue_capacity: cfg.queue_capacity,
            download_dir,
            namespace_dirs: cfg.namespace_dirs,
            audio_extension: cfg.acquisition.audio_format.clone(),
        }
    }

    fn admission_limit(&self) -> usize {
        self.worker_count.max(1) + self.queue_capacity
    }
}

/// State shared by the dispatcher handle and its workers.
pub(crate) struct Shared {
    deps: DispatchDeps,
    settings: DispatchSettings,
    control: JobControl,
}

pub struct Dispatcher {
    shared: Arc<Shared>,
    tx: mpsc::Sender<QueuedJob>,
    admission: Arc<Semaphore>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns the worker pool. Must be called inside a tokio runtime.
    pub fn start(deps: DispatchDeps, settings: DispatchSettings) -> Self {
        let limit = settings.admission_limit();
        let worker_count = settings.worker_count.max(1);
        let (tx, rx) = mpsc::channel(limit);
        let shared = Arc::new(Shared {
            deps,
            settings,
            control: JobControl::new(),
        });
        let workers = pool::spawn_workers(worker_count, rx, Arc::clone(&shared));
        tracing::debug!(workers = worker_count, admission_limit = limit, "dispatcher started");
        Self {
            shared,
            tx,
            admission: Arc::new(Semaphore::new(limit)),
            workers,
        }
    }

    /// Resolves `reference`, persists a `PENDING` job and queues it.
    /// Returns without waiting for any track to be processed.
    pub async fn submit(&self, reference: &CollectionRef, owner: &str) -> Result<JobId, DispatchError> {
        let permit = match Arc::clone(&self.admission).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                tracing::warn!(%reference, owner, "rejecting submission: queue full");
                return Err(DispatchError::CapacityExceeded);
            }
            Err(TryAcquireError::Closed) => return Err(DispatchError::ShuttingDown),
        };

        let collection = self
            .shared
            .deps
            .catalog
            .resolve(reference, owner)
            .await
            .map_err(|e| {
                tracing::warn!(%reference, owner, "collection resolution failed: {}", e);
                DispatchError::Resolution(e)
            })?;

        let total = u32::try_from(collection.tracks.len()).unwrap_or(u32::MAX);
        let job = Job::new(
            owner,
            collection.kind,
            collection.id,
            collection.display_name,
            total,
        );
        self.shared
            .deps
            .store
            .create(&job)
            .await
            .map_err(DispatchError::Store)?;
        let job_id = job.id;
        let abort = self.shared.control.register(job_id);
        tracing::info!(%job_id, owner, %reference, tracks = total, "job queued");

        let queued = QueuedJob {
            job,
            tracks: collection.tracks,
            abort,
            permit,
        };
        if self.tx.try_send(queued).is_err() {
            self.shared.control.unregister(job_id);
            run::record_dispatch_failure(&self.shared, job_id, "dispatcher is shutting down").await;
            return Err(DispatchError::ShuttingDown);
        }
        Ok(job_id)
    }

    /// Requests cooperative cancellation. The job ends as `CANCELLED` before
    /// its next track. Returns false for an unknown id, a job owned by
    /// someone else, or a job that already finished.
    pub async fn cancel(&self, job_id: JobId, owner: &str) -> Result<bool> {
        let Some(job) = self
            .shared
            .deps
            .store
            .find_by_job_id_and_owner(job_id, owner)
            .await?
        else {
            return Ok(false);
        };
        if job.status.is_terminal() {
            return Ok(false);
        }
        let requested = self.shared.control.request_abort(job_id);
        if requested {
            tracing::info!(%job_id, owner, "cancellation requested");
        }
        Ok(requested)
    }

    /// `None` when no job with that id is owned by `owner`.
    pub async fn get_progress(&self, job_id: JobId, owner: &str) -> Result<Option<ProgressSnapshot>> {
        let job = self
            .shared
            .deps
            .store
            .find_by_job_id_and_owner(job_id, owner)
            .await?;
        Ok(job.as_ref().map(ProgressSnapshot::project))
    }

    /// The owner's jobs, newest first.
    pub async fn list_progress(&self, owner: &str, active_only: bool) -> Result<Vec<ProgressSnapshot>> {
        let jobs = self.shared.deps.store.list_by_owner(owner, active_only).await?;
        Ok(jobs.iter().map(ProgressSnapshot::project).collect())
    }

    /// Stops admission, lets the workers drain every queued job, and waits for them.
    pub async fn shutdown(self) {
        let Dispatcher {
            tx,
            admission,
            workers,
            ..
        } = self;
        admission.close();
        drop(tx);
        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!("worker task join: {}", e);
            }
        }
        tracing::debug!("dispatcher stopped");
    }
}
