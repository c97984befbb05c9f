//! Job read operations: get and list.

use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::super::db::JobDb;
use super::super::types::{Job, JobId, JobStatus};
use crate::catalog::CollectionKind;

const JOB_COLUMNS: &str = r#"
    job_id, owner_id, collection_kind, collection_id, display_name,
    total_tracks, completed_tracks, failed_tracks, status,
    current_track_name, current_artist_name, current_file_path,
    last_error_message, created_at, completed_at
"#;

fn job_from_row(row: &SqliteRow) -> Result<Job> {
    let job_id: String = row.get("job_id");
    let kind: String = row.get("collection_kind");
    let status: String = row.get("status");
    let total: i64 = row.get("total_tracks");
    let completed: i64 = row.get("completed_tracks");
    let failed: i64 = row.get("failed_tracks");

    Ok(Job {
        id: JobId::parse_str(&job_id)?,
        owner: row.get("owner_id"),
        collection_kind: CollectionKind::from_str(&kind)
            .ok_or_else(|| anyhow!("job {job_id}: unknown collection kind {kind:?}"))?,
        collection_id: row.get("collection_id"),
        display_name: row.get("display_name"),
        total_tracks: u32::try_from(total)?,
        completed_tracks: u32::try_from(completed)?,
        failed_tracks: u32::try_from(failed)?,
        status: JobStatus::from_str(&status),
        current_track_name: row.get("current_track_name"),
        current_artist_name: row.get("current_artist_name"),
        current_file_path: row.get("current_file_path"),
        last_error_message: row.get("last_error_message"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    })
}

impl JobDb {
    /// Fetch a single job by id.
    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(job_from_row).transpose()
    }

    /// Fetch a job only if it belongs to `owner`.
    pub async fn get_owned_job(&self, id: JobId, owner: &str) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = ?1 AND owner_id = ?2");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(job_from_row).transpose()
    }

    /// List an owner's jobs, newest first.
    pub async fn list_owner_jobs(&self, owner: &str, active_only: bool) -> Result<Vec<Job>> {
        let filter = if active_only {
            "AND status IN ('PENDING', 'IN_PROGRESS')"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE owner_id = ?1 {filter} \
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql).bind(owner).fetch_all(&self.pool).await?;
        rows.iter().map(job_from_row).collect()
    }
}
