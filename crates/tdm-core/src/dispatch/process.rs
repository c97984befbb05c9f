//! Per-track processing: idempotency check, primary attempt, live-version
//! fallback, and the counter update that follows.

use anyhow::Result;
use std::path::Path;

use crate::acquire::{build_search_query, decide, Acquirer, FallbackDecision};
use crate::catalog::TrackDescriptor;
use crate::job_db::{Job, JobStore};
use crate::naming::track_path;

/// What happened to one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The destination file already existed; the tool was not invoked.
    AlreadyPresent,
    Acquired,
    /// The primary attempt failed and the marker-stripped retry succeeded.
    AcquiredWithFallback,
    /// Untruncated message of the attempt that counted.
    Failed { message: String },
}

/// Runs one track of a job against the acquirer and persists every step.
pub struct TrackProcessor<'a> {
    acquirer: &'a dyn Acquirer,
    store: &'a dyn JobStore,
    extension: &'a str,
}

impl<'a> TrackProcessor<'a> {
    pub fn new(acquirer: &'a dyn Acquirer, store: &'a dyn JobStore, extension: &'a str) -> Self {
        Self {
            acquirer,
            store,
            extension,
        }
    }

    /// Acquisition failures are absorbed into `failed_tracks`; only store
    /// and state-machine errors are returned.
    pub async fn process(
        &self,
        job: &mut Job,
        track: &TrackDescriptor,
        destination: &Path,
    ) -> Result<TrackOutcome> {
        let path = track_path(destination, track, self.extension);
        job.begin_track(&track.artist, &track.title, &path.to_string_lossy())?;
        self.store.save(job).await?;
        tracing::debug!(job_id = %job.id, track = %track.title, artist = %track.artist, "processing track");

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(job_id = %job.id, path = %path.display(), "file already exists");
            job.record_completed()?;
            self.store.save(job).await?;
            return Ok(TrackOutcome::AlreadyPresent);
        }

        let query = build_search_query(&track.artist, &track.title, false);
        let outcome = match self.acquirer.acquire(&query, &path).await {
            Ok(()) => TrackOutcome::Acquired,
            Err(primary) => match decide(primary.exit_code(), &track.title) {
                FallbackDecision::RetryWithTitle(title) => {
                    let fallback = build_search_query(&track.artist, &title, false);
                    tracing::info!(job_id = %job.id, query = %fallback, "retrying without live markers");
                    match self.acquirer.acquire(&fallback, &path).await {
                        Ok(()) => TrackOutcome::AcquiredWithFallback,
                        Err(e) => TrackOutcome::Failed { message: e.message() },
                    }
                }
                FallbackDecision::NoRetry => TrackOutcome::Failed {
                    message: primary.message(),
                },
            },
        };

        match &outcome {
            TrackOutcome::Failed { message } => {
                tracing::warn!(job_id = %job.id, track = %track.title, "track failed: {}", message);
                job.record_failed(message)?;
            }
            _ => job.record_completed()?,
        }
        self.store.save(job).await?;
        Ok(outcome)
    }
}
