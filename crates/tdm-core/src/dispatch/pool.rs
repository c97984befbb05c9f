//! Fixed-size worker pool draining the admitted-job queue.

use std::any::Any;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedSemaphorePermit};
use tokio::task::JoinHandle;

use crate::catalog::TrackDescriptor;
use crate::control::AbortToken;
use crate::job_db::Job;

use super::run::{record_dispatch_failure, run_job};
use super::Shared;

/// An admitted job waiting for a worker. Holding `permit` keeps its
/// admission slot taken until the job is terminal.
pub(super) struct QueuedJob {
    pub job: Job,
    pub tracks: Vec<TrackDescriptor>,
    pub abort: AbortToken,
    pub permit: OwnedSemaphorePermit,
}

pub(super) fn spawn_workers(
    count: usize,
    rx: mpsc::Receiver<QueuedJob>,
    shared: Arc<Shared>,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));
    (0..count)
        .map(|id| {
            let rx = Arc::clone(&rx);
            let shared = Arc::clone(&shared);
            tokio::spawn(async move { worker_loop(id, rx, shared).await })
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "job task panicked".to_string()
    }
}

async fn worker_loop(id: usize, rx: Arc<Mutex<mpsc::Receiver<QueuedJob>>>, shared: Arc<Shared>) {
    tracing::debug!(worker = id, "worker started");
    loop {
        let next = rx.lock().await.recv().await;
        let Some(queued) = next else {
            break;
        };
        let QueuedJob {
            job,
            tracks,
            abort,
            permit,
        } = queued;
        let job_id = job.id;

        // Run in its own task so a panic surfaces as a JoinError here.
        let handle = tokio::spawn(run_job(Arc::clone(&shared), job, tracks, abort));
        let failure = match handle.await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("{e:#}")),
            Err(e) if e.is_panic() => Some(panic_message(e.into_panic().as_ref())),
            Err(e) => Some(e.to_string()),
        };
        if let Some(message) = failure {
            tracing::error!(worker = id, %job_id, "job failed unexpectedly: {}", message);
            record_dispatch_failure(&shared, job_id, &message).await;
        }

        shared.control.unregister(job_id);
        drop(permit);
    }
    tracing::debug!(worker = id, "worker stopped");
}
