//! File-backed catalog: one JSON manifest per collection, `<dir>/<id>.json`.
//!
//! ```json
//! {
//!   "name": "Discovery",
//!   "kind": "album",
//!   "tracks": [
//!     { "id": "0DiWol3AO6WpXZgp0goxAV", "title": "One More Time",
//!       "artists": ["Daft Punk"], "duration_ms": 320357 }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use super::{Catalog, CatalogError, CollectionKind, CollectionRef, ResolvedCollection, TrackDescriptor};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    name: Option<String>,
    kind: CollectionKind,
    #[serde(default)]
    tracks: Vec<ManifestTrack>,
}

#[derive(Debug, Deserialize)]
struct ManifestTrack {
    id: String,
    title: String,
    #[serde(default)]
    artists: Vec<String>,
    #[serde(default)]
    duration_ms: u64,
}

/// Catalog reading collection manifests from a directory.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    dir: PathBuf,
}

impl ManifestCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn manifest_path(&self, reference: &CollectionRef) -> PathBuf {
        self.dir.join(format!("{}.json", reference.id))
    }
}

/// Keeps the first occurrence of each track id, preserving order.
fn dedup_tracks(tracks: Vec<ManifestTrack>) -> Vec<TrackDescriptor> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .map(|t| TrackDescriptor {
            artist: t.artists.into_iter().next().unwrap_or_default(),
            id: t.id,
            title: t.title,
            duration: Duration::from_millis(t.duration_ms),
        })
        .collect()
}

#[async_trait]
impl Catalog for ManifestCatalog {
    async fn resolve(
        &self,
        reference: &CollectionRef,
        _owner: &str,
    ) -> Result<ResolvedCollection, CatalogError> {
        let path = self.manifest_path(reference);
        let not_found = || CatalogError::NotFound {
            kind: reference.kind,
            id: reference.id.clone(),
        };

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(CatalogError::Unavailable(format!(
                    "read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let manifest: Manifest = serde_json::from_str(&data).map_err(|e| {
            CatalogError::Unavailable(format!("malformed manifest {}: {}", path.display(), e))
        })?;
        if manifest.kind != reference.kind {
            return Err(not_found());
        }

        let tracks = dedup_tracks(manifest.tracks);
        tracing::debug!(
            collection = %reference,
            tracks = tracks.len(),
            "resolved collection from manifest"
        );
        Ok(ResolvedCollection {
            kind: reference.kind,
            id: reference.id.clone(),
            display_name: manifest.name.filter(|n| !n.trim().is_empty()),
            tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &std::path::Path, id: &str, body: &str) {
        std::fs::write(dir.join(format!("{id}.json")), body).unwrap();
    }

    #[tokio::test]
    async fn resolves_tracks_in_order_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "disc1",
            r#"{
                "name": "Discovery",
                "kind": "album",
                "tracks": [
                    { "id": "t1", "title": "One More Time", "artists": ["Daft Punk", "Romanthony"], "duration_ms": 320357 },
                    { "id": "t2", "title": "Aerodynamic", "artists": ["Daft Punk"] },
                    { "id": "t1", "title": "One More Time", "artists": ["Daft Punk"] },
                    { "id": "t3", "title": "Untitled" }
                ]
            }"#,
        );
        let catalog = ManifestCatalog::new(dir.path());
        let resolved = catalog
            .resolve(&CollectionRef::new(CollectionKind::Album, "disc1"), "alice")
            .await
            .unwrap();

        assert_eq!(resolved.display_name.as_deref(), Some("Discovery"));
        let titles: Vec<_> = resolved.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["One More Time", "Aerodynamic", "Untitled"]);
        assert_eq!(resolved.tracks[0].artist, "Daft Punk");
        assert_eq!(resolved.tracks[0].duration, Duration::from_millis(320357));
        assert_eq!(resolved.tracks[2].artist, "");
    }

    #[tokio::test]
    async fn missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ManifestCatalog::new(dir.path());
        let err = catalog
            .resolve(&CollectionRef::new(CollectionKind::Playlist, "nope"), "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn kind_mismatch_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "x", r#"{ "kind": "album", "tracks": [] }"#);
        let catalog = ManifestCatalog::new(dir.path());
        let err = catalog
            .resolve(&CollectionRef::new(CollectionKind::Playlist, "x"), "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_manifest_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "bad", "{ not json");
        let catalog = ManifestCatalog::new(dir.path());
        let err = catalog
            .resolve(&CollectionRef::new(CollectionKind::Album, "bad"), "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
