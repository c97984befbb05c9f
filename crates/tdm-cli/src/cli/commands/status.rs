//! `tdm status` – show one job's progress.

use anyhow::Result;
use tdm_core::dispatch::ProgressSnapshot;
use tdm_core::job_db::{JobDb, JobId};

use super::progress_line;

pub async fn run_status(db: &JobDb, job_id: JobId, owner: &str) -> Result<()> {
    let Some(job) = db.get_owned_job(job_id, owner).await? else {
        println!("Job {job_id} not found.");
        return Ok(());
    };
    let snap = ProgressSnapshot::project(&job);
    println!("Job:        {}", snap.job_id);
    println!(
        "Collection: {} {} ({})",
        snap.collection_kind,
        snap.collection_id,
        snap.display_name.as_deref().unwrap_or("-")
    );
    println!("Progress:   {}", progress_line(&snap));
    if let Some(path) = &snap.current_file_path {
        println!("File:       {path}");
    }
    if let Some(err) = &snap.error_message {
        println!("Last error: {err}");
    }
    Ok(())
}
