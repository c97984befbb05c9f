//! `tdm list` – show the owner's jobs, newest first.

use anyhow::Result;
use tdm_core::job_db::JobDb;

pub async fn run_list(db: &JobDb, owner: &str, active_only: bool) -> Result<()> {
    let jobs = db.list_owner_jobs(owner, active_only).await?;
    if jobs.is_empty() {
        println!("No jobs for {owner}.");
        return Ok(());
    }
    println!("{:<36} {:<11} {:<9} {:<7} {}", "ID", "STATUS", "TRACKS", "FAILED", "NAME");
    for j in jobs {
        println!(
            "{:<36} {:<11} {:<9} {:<7} {}",
            j.id,
            j.status,
            format!("{}/{}", j.completed_tracks, j.total_tracks),
            j.failed_tracks,
            j.display_name.as_deref().unwrap_or(&j.collection_id)
        );
    }
    Ok(())
}
