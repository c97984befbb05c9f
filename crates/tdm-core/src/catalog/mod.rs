//! Catalog collaborator interface: turns a collection reference into an
//! ordered, deduplicated track list and a display name.
//!
//! The core only depends on the [`Catalog`] trait. [`ManifestCatalog`] is a
//! file-backed implementation for running without a remote catalog.

mod manifest;
mod reference;

pub use manifest::ManifestCatalog;
pub use reference::CollectionRef;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of collection a job downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Playlist,
    Album,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Playlist => "playlist",
            CollectionKind::Album => "album",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "playlist" => Some(CollectionKind::Playlist),
            "album" => Some(CollectionKind::Album),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Resolved metadata for one track. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub id: String,
    pub title: String,
    /// Primary artist; empty when the catalog lists none.
    pub artist: String,
    pub duration: Duration,
}

/// A collection resolved once at submission; the track order is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCollection {
    pub kind: CollectionKind,
    pub id: String,
    pub display_name: Option<String>,
    pub tracks: Vec<TrackDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("not a playlist or album reference: {0:?}")]
    InvalidReference(String),
    #[error("catalog credentials are missing or expired")]
    InvalidCredentials,
    #[error("{kind} {id} not found in catalog")]
    NotFound { kind: CollectionKind, id: String },
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Catalog lookups on behalf of `owner`. Pagination and deduplication are
/// the implementation's job; callers only ever see the complete list.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn resolve(
        &self,
        reference: &CollectionRef,
        owner: &str,
    ) -> Result<ResolvedCollection, CatalogError>;
}
