//! One job's background task: start, walk the tracks in order, finish.

use anyhow::Result;
use std::sync::Arc;

use crate::catalog::TrackDescriptor;
use crate::control::AbortToken;
use crate::job_db::{Job, JobId};
use crate::naming::collection_dir_name;

use super::process::{TrackOutcome, TrackProcessor};
use super::Shared;

/// Runs a dispatched job to a terminal state. Errors returned here are
/// dispatch failures; the worker records them on the job.
pub(super) async fn run_job(
    shared: Arc<Shared>,
    mut job: Job,
    tracks: Vec<TrackDescriptor>,
    abort: AbortToken,
) -> Result<()> {
    let store = shared.deps.store.as_ref();

    if abort.is_aborted() {
        job.cancel()?;
        store.save(&job).await?;
        tracing::info!(job_id = %job.id, "job cancelled before start");
        return Ok(());
    }

    job.start()?;
    store.save(&job).await?;
    tracing::info!(
        job_id = %job.id,
        collection = %job.collection_id,
        tracks = tracks.len(),
        "job started"
    );

    let dir = shared.settings.download_dir.join(collection_dir_name(
        job.display_name.as_deref(),
        &job.collection_id,
        shared.settings.namespace_dirs,
    ));
    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        tracing::warn!(job_id = %job.id, "could not create {}: {}", dir.display(), e);
    }

    let processor = TrackProcessor::new(
        shared.deps.acquirer.as_ref(),
        store,
        &shared.settings.audio_extension,
    );
    let mut last_failure: Option<String> = None;
    for track in &tracks {
        if abort.is_aborted() {
            job.cancel()?;
            store.save(&job).await?;
            tracing::info!(
                job_id = %job.id,
                processed = job.processed_tracks(),
                "job cancelled"
            );
            return Ok(());
        }
        if let TrackOutcome::Failed { message } = processor.process(&mut job, track, &dir).await? {
            last_failure = Some(message);
        }
    }

    job.finish(last_failure.as_deref())?;
    store.save(&job).await?;
    tracing::info!(
        job_id = %job.id,
        status = %job.status,
        completed = job.completed_tracks,
        failed = job.failed_tracks,
        "job finished"
    );
    Ok(())
}

/// Forces the stored record of `job_id` to `FAILED` with `message`.
/// Terminal records are left untouched.
pub(super) async fn record_dispatch_failure(shared: &Shared, job_id: JobId, message: &str) {
    let store = shared.deps.store.as_ref();
    let mut job = match store.find_by_job_id(job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            tracing::error!(%job_id, "dispatch failure for unknown job: {}", message);
            return;
        }
        Err(e) => {
            tracing::error!(%job_id, "could not load job to record failure: {:#}", e);
            return;
        }
    };
    if job.status.is_terminal() {
        return;
    }
    if let Err(e) = job.fail(message) {
        tracing::error!(%job_id, "could not fail job: {}", e);
        return;
    }
    if let Err(e) = store.save(&job).await {
        tracing::error!(%job_id, "could not persist job failure: {:#}", e);
    }
}
