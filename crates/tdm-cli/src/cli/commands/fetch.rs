//! `tdm fetch` – submit one collection and follow it to the end.

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tdm_core::acquire::YtDlpAcquirer;
use tdm_core::catalog::{CollectionRef, ManifestCatalog};
use tdm_core::config::TdmConfig;
use tdm_core::dispatch::{DispatchDeps, DispatchSettings, Dispatcher};
use tdm_core::job_db::{JobDb, JobStatus};

use super::progress_line;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub async fn run_fetch(
    db: &JobDb,
    cfg: &TdmConfig,
    reference: &str,
    owner: &str,
    download_dir: &Path,
) -> Result<()> {
    let reference = CollectionRef::parse(reference)?;
    let interrupted = db.fail_interrupted_jobs().await?;
    if interrupted > 0 {
        tracing::info!("marked {} interrupted job(s) from a previous run as failed", interrupted);
    }

    let deps = DispatchDeps {
        catalog: Arc::new(ManifestCatalog::new(cfg.resolved_catalog_dir()?)),
        acquirer: Arc::new(YtDlpAcquirer::from_config(&cfg.acquisition)),
        store: Arc::new(db.clone()),
    };
    let dispatcher = Dispatcher::start(
        deps,
        DispatchSettings::from_config(cfg, download_dir.to_path_buf()),
    );

    let job_id = match dispatcher.submit(&reference, owner).await {
        Ok(id) => id,
        Err(e) => {
            dispatcher.shutdown().await;
            return Err(e.into());
        }
    };
    println!("Queued job {job_id} for {reference}");

    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut cancel_requested = false;
    let mut last_line = String::new();
    let final_snapshot = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(snap) = dispatcher.get_progress(job_id, owner).await? else {
                    bail!("job {job_id} disappeared from the job store");
                };
                let line = progress_line(&snap);
                if line != last_line {
                    println!("  {line}");
                    last_line = line;
                }
                if snap.status.is_terminal() {
                    break snap;
                }
            }
            signal = tokio::signal::ctrl_c(), if !cancel_requested => {
                signal?;
                cancel_requested = true;
                if dispatcher.cancel(job_id, owner).await? {
                    println!("Cancelling job {job_id} after the current track...");
                }
            }
        }
    };
    dispatcher.shutdown().await;

    println!(
        "Job {} {}: {} completed, {} failed of {}",
        job_id,
        final_snapshot.status,
        final_snapshot.completed_tracks,
        final_snapshot.failed_tracks,
        final_snapshot.total_tracks
    );
    if let Some(err) = &final_snapshot.error_message {
        println!("Last error: {err}");
    }
    if final_snapshot.status != JobStatus::Completed {
        bail!("job {} ended {}", job_id, final_snapshot.status);
    }
    Ok(())
}
