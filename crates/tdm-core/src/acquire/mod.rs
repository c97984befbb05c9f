//! Track acquisition: search query construction, the external tool
//! contract, and the live-version fallback policy.
//!
//! The processor only depends on the [`Acquirer`] trait; [`YtDlpAcquirer`]
//! runs the external tool as a subprocess.

mod fallback;
mod query;
mod ytdlp;

pub use fallback::{contains_live_marker, decide, strip_live_markers, FallbackDecision};
pub use query::{build_search_query, OFFICIAL_AUDIO_QUALIFIER, SINGLE_RESULT_PREFIX};
pub use ytdlp::YtDlpAcquirer;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Exit code of the tool's generic "no match / failed" outcome.
pub const NOT_FOUND_EXIT_CODE: i32 = 1;

/// Exit code reported for an attempt killed at its deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// A failed acquisition attempt.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("acquisition tool exited with code {code}")]
    Exited { code: i32, output: String },
    #[error("acquisition timed out after {after:?}")]
    TimedOut { after: Duration, output: String },
    #[error("acquisition tool was terminated by a signal")]
    Terminated { output: String },
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("acquisition tool reported success but {} does not exist", .path.display())]
    MissingOutput { path: PathBuf },
}

impl AcquisitionError {
    /// Exit code as seen by the fallback policy. A timeout reports
    /// [`TIMEOUT_EXIT_CODE`]; spawn failures, signals and missing output have none.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            AcquisitionError::Exited { code, .. } => Some(*code),
            AcquisitionError::TimedOut { .. } => Some(TIMEOUT_EXIT_CODE),
            AcquisitionError::Terminated { .. }
            | AcquisitionError::Spawn { .. }
            | AcquisitionError::MissingOutput { .. } => None,
        }
    }

    /// Combined stdout+stderr captured from the tool, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            AcquisitionError::Exited { output, .. }
            | AcquisitionError::TimedOut { output, .. }
            | AcquisitionError::Terminated { output } => Some(output.as_str()),
            AcquisitionError::Spawn { .. } | AcquisitionError::MissingOutput { .. } => None,
        }
    }

    /// Message persisted on the job: the captured output verbatim when there
    /// is any, otherwise the error description.
    pub fn message(&self) -> String {
        match self.output().map(str::trim) {
            Some(output) if !output.is_empty() => output.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Runs one acquisition attempt: fetch the first hit for `query` as audio into `output_path`.
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(&self, query: &str, output_path: &Path) -> Result<(), AcquisitionError>;
}
