//! SQLite-backed job database implementation.
//!
//! Handles connection and migrations. Job CRUD lives in `jobs`.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the SQLite-backed job database.
///
/// The database file is stored under the XDG state directory:
/// `~/.local/state/tdm/jobs.db` on Debian.
#[derive(Clone)]
pub struct JobDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl JobDb {
    /// Open (or create) the default job database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("tdm")?;
        let db_path = xdg_dirs.get_state_home().join("jobs.db");
        Self::open_at(&db_path).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let db = JobDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // One row per job; counters and activity fields are rewritten on every save.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY NOT NULL,
                owner_id TEXT NOT NULL,
                collection_kind TEXT NOT NULL,
                collection_id TEXT NOT NULL,
                display_name TEXT,
                total_tracks INTEGER NOT NULL,
                completed_tracks INTEGER NOT NULL DEFAULT 0,
                failed_tracks INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL,
                current_track_name TEXT,
                current_artist_name TEXT,
                current_file_path TEXT,
                last_error_message TEXT,
                created_at INTEGER NOT NULL,
                completed_at INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS jobs_owner_created
            ON jobs (owner_id, created_at DESC);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<JobDb> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = JobDb { pool };
    db.migrate().await?;
    Ok(db)
}
