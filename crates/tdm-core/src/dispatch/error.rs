//! Errors returned synchronously to a submitter.

use crate::catalog::CatalogError;

/// Why `submit` did not admit a job. In every case no job record exists.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("could not resolve collection: {0}")]
    Resolution(#[from] CatalogError),
    #[error("download queue is full; try again once a running job finishes")]
    CapacityExceeded,
    #[error("dispatcher is shutting down")]
    ShuttingDown,
    #[error("job store error: {0:#}")]
    Store(anyhow::Error),
}
