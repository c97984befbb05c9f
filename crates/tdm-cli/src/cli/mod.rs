//! CLI for the TDM collection downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tdm_core::config;
use tdm_core::job_db::{JobDb, JobId};

use commands::{run_fetch, run_list, run_status};

/// Top-level CLI for the TDM collection downloader.
#[derive(Debug, Parser)]
#[command(name = "tdm")]
#[command(about = "TDM: download every track of a playlist or album", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a playlist or album and wait for it to finish.
    Fetch {
        /// `playlist:<id>`, `album:<id>` or a catalog URL.
        reference: String,
        /// Owner recorded on the job (default: $USER).
        #[arg(long)]
        owner: Option<String>,
        /// Base directory for the collection folder (default: config, then current directory).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Show progress of one job.
    Status {
        /// Job identifier (UUID).
        job_id: JobId,
        /// Owner of the job (default: $USER).
        #[arg(long)]
        owner: Option<String>,
    },

    /// List jobs, newest first.
    List {
        /// Owner whose jobs to list (default: $USER).
        #[arg(long)]
        owner: Option<String>,
        /// Only pending and in-progress jobs.
        #[arg(long)]
        active: bool,
    },
}

/// Explicit `--owner`, else `$USER`, else `local`.
fn resolve_owner(owner: Option<String>) -> String {
    owner
        .or_else(|| std::env::var("USER").ok())
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| "local".to_string())
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let db = JobDb::open_default().await?;

        match cli.command {
            CliCommand::Fetch {
                reference,
                owner,
                download_dir,
            } => {
                let download_dir = match download_dir.or_else(|| cfg.download_dir.clone()) {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_fetch(&db, &cfg, &reference, &resolve_owner(owner), &download_dir).await?;
            }
            CliCommand::Status { job_id, owner } => {
                run_status(&db, job_id, &resolve_owner(owner)).await?
            }
            CliCommand::List { owner, active } => {
                run_list(&db, &resolve_owner(owner), active).await?
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
