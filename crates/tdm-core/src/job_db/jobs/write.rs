//! Job write operations: create, whole-record save, crash recovery.

use anyhow::{bail, Result};

use super::super::db::JobDb;
use super::super::store::{check_overwrite, StoreError};
use super::super::types::{unix_timestamp, Job};

/// Error recorded on jobs that were still live when a previous process exited.
pub const INTERRUPTED_MESSAGE: &str = "interrupted before completion";

impl JobDb {
    /// Insert a new job row. Fails if a row with the same id exists.
    pub async fn insert_job(&self, job: &Job) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (
                job_id, owner_id, collection_kind, collection_id, display_name,
                total_tracks, completed_tracks, failed_tracks, status,
                current_track_name, current_artist_name, current_file_path,
                last_error_message, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(job_id) DO NOTHING
            "#,
        )
        .bind(job.id.to_string())
        .bind(&job.owner)
        .bind(job.collection_kind.as_str())
        .bind(&job.collection_id)
        .bind(&job.display_name)
        .bind(i64::from(job.total_tracks))
        .bind(i64::from(job.completed_tracks))
        .bind(i64::from(job.failed_tracks))
        .bind(job.status.as_str())
        .bind(&job.current_track_name)
        .bind(&job.current_artist_name)
        .bind(&job.current_file_path)
        .bind(&job.last_error_message)
        .bind(job.created_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(job.id).into());
        }
        Ok(())
    }

    /// Upsert the whole record. Identity fields (owner, collection, total,
    /// created_at) are fixed at insert; a terminal row is never overwritten
    /// and counters never move backwards.
    pub async fn upsert_job(&self, job: &Job) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (
                job_id, owner_id, collection_kind, collection_id, display_name,
                total_tracks, completed_tracks, failed_tracks, status,
                current_track_name, current_artist_name, current_file_path,
                last_error_message, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(job_id) DO UPDATE SET
                display_name = excluded.display_name,
                completed_tracks = excluded.completed_tracks,
                failed_tracks = excluded.failed_tracks,
                status = excluded.status,
                current_track_name = excluded.current_track_name,
                current_artist_name = excluded.current_artist_name,
                current_file_path = excluded.current_file_path,
                last_error_message = excluded.last_error_message,
                completed_at = excluded.completed_at
            WHERE jobs.status IN ('PENDING', 'IN_PROGRESS')
              AND excluded.completed_tracks >= jobs.completed_tracks
              AND excluded.failed_tracks >= jobs.failed_tracks
            "#,
        )
        .bind(job.id.to_string())
        .bind(&job.owner)
        .bind(job.collection_kind.as_str())
        .bind(&job.collection_id)
        .bind(&job.display_name)
        .bind(i64::from(job.total_tracks))
        .bind(i64::from(job.completed_tracks))
        .bind(i64::from(job.failed_tracks))
        .bind(job.status.as_str())
        .bind(&job.current_track_name)
        .bind(&job.current_artist_name)
        .bind(&job.current_file_path)
        .bind(&job.last_error_message)
        .bind(job.created_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        match self.get_job(job.id).await? {
            Some(existing) => {
                check_overwrite(&existing, job)?;
                bail!("job {}: save matched no row", job.id)
            }
            None => bail!("job {}: save matched no row", job.id),
        }
    }

    /// Mark every `PENDING`/`IN_PROGRESS` job as `FAILED` (e.g. after a crash).
    /// Call before dispatching so stranded jobs don't look live forever.
    /// Returns the number of jobs closed.
    pub async fn fail_interrupted_jobs(&self) -> Result<u64> {
        let r = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'FAILED',
                completed_at = ?1,
                last_error_message = ?2,
                current_track_name = NULL,
                current_artist_name = NULL,
                current_file_path = NULL
            WHERE status IN ('PENDING', 'IN_PROGRESS')
            "#,
        )
        .bind(unix_timestamp())
        .bind(INTERRUPTED_MESSAGE)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }
}
