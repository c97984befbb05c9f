//! In-process catalog and acquirer doubles.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;

use tdm_core::acquire::{Acquirer, AcquisitionError};
use tdm_core::catalog::{
    Catalog, CatalogError, CollectionKind, CollectionRef, ResolvedCollection, TrackDescriptor,
};

pub fn track(id: &str, artist: &str, title: &str) -> TrackDescriptor {
    TrackDescriptor {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        duration: Duration::from_secs(180),
    }
}

pub fn playlist(id: &str, name: &str, tracks: Vec<TrackDescriptor>) -> ResolvedCollection {
    ResolvedCollection {
        kind: CollectionKind::Playlist,
        id: id.to_string(),
        display_name: Some(name.to_string()),
        tracks,
    }
}

/// Catalog serving a fixed set of collections by id.
#[derive(Default)]
pub struct StaticCatalog {
    collections: HashMap<String, ResolvedCollection>,
    failure: Option<CatalogError>,
}

impl StaticCatalog {
    pub fn with(collections: Vec<ResolvedCollection>) -> Self {
        Self {
            collections: collections.into_iter().map(|c| (c.id.clone(), c)).collect(),
            failure: None,
        }
    }

    /// Every lookup fails with `error`.
    pub fn failing(error: CatalogError) -> Self {
        Self {
            collections: HashMap::new(),
            failure: Some(error),
        }
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn resolve(
        &self,
        reference: &CollectionRef,
        _owner: &str,
    ) -> Result<ResolvedCollection, CatalogError> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        self.collections
            .get(&reference.id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind: reference.kind,
                id: reference.id.clone(),
            })
    }
}

/// Scripted reply of the fake acquirer.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write the output file and succeed.
    Success,
    /// Fail as if the tool exited with `code` printing `output`.
    Exit(i32, &'static str),
    Panic(&'static str),
}

/// Acquirer replying per exact query; unscripted queries succeed.
/// With a gate, every call first waits for one gate permit.
#[derive(Default)]
pub struct ScriptedAcquirer {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl ScriptedAcquirer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls block until [`ScriptedAcquirer::open_gate`] releases them.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn reply(self, query: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(query.into(), replies.into());
        self
    }

    pub fn open_gate(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Acquirer for ScriptedAcquirer {
    async fn acquire(&self, query: &str, output_path: &Path) -> Result<(), AcquisitionError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(|r| r.pop_front())
            .unwrap_or(Reply::Success);
        match reply {
            Reply::Success => {
                tokio::fs::write(output_path, b"audio").await.unwrap();
                Ok(())
            }
            Reply::Exit(code, output) => Err(AcquisitionError::Exited {
                code,
                output: output.to_string(),
            }),
            Reply::Panic(msg) => panic!("{}", msg),
        }
    }
}
