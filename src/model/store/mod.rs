//! Durable key-value store for window, layout, window-list and surface-group
//! state.
//!
//! Each collection lives in its own JSON document. Every write loads the
//! current document, merges the one addressed key, and atomically replaces the
//! whole document, so unknown keys written by sibling processes survive. There
//! is no transaction across documents: last writer wins per document.

mod backend;
mod document;

use std::path::PathBuf;
use std::sync::Arc;

pub use backend::{DocumentBackend, DocumentKind, FsBackend, MemoryBackend};
pub use document::Document;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::ids::{GroupId, SurfaceId, WindowId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write the {document} document")]
    Write {
        document: DocumentKind,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode the {document} document")]
    Encode {
        document: DocumentKind,
        #[source]
        source: serde_json::Error,
    },
}

const GROUP_KEY: &str = "group";

#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn DocumentBackend>,
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

impl PersistentStore {
    pub fn new(backend: impl DocumentBackend + 'static) -> Self { Self { backend: Arc::new(backend) } }

    pub fn with_backend(backend: Arc<dyn DocumentBackend>) -> Self { Self { backend } }

    /// Store backed by files in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Self { Self::new(FsBackend::new(dir)) }

    pub fn in_memory() -> Self { Self::new(MemoryBackend::new()) }

    pub fn document(&self, kind: DocumentKind) -> Document { Document::load(&*self.backend, kind) }

    fn update(&self, kind: DocumentKind, f: impl FnOnce(&mut Document)) -> Result<(), StoreError> {
        let mut doc = self.document(kind);
        f(&mut doc);
        doc.store(&*self.backend, kind)
    }

    fn entry(&self, kind: DocumentKind, key: &str) -> Option<Value> {
        self.document(kind).object(kind.root_key()).and_then(|map| map.get(key)).cloned()
    }

    /// Opaque state blob of a window; an empty object if none was stored.
    pub fn window_state(&self, id: WindowId) -> Value {
        self.entry(DocumentKind::WindowStates, &id.key()).unwrap_or_else(empty_object)
    }

    pub fn put_window_state(&self, id: WindowId, blob: Value) -> Result<(), StoreError> {
        let kind = DocumentKind::WindowStates;
        self.update(kind, |doc| {
            doc.object_mut(kind.root_key()).insert(id.key(), blob);
        })
    }

    /// Applies `f` to the blobs of `ids` (created empty if absent) in a single
    /// read-modify-write of the window states document.
    pub fn update_window_states<F>(&self, ids: &[WindowId], mut f: F) -> Result<(), StoreError>
    where F: FnMut(WindowId, &mut Value) {
        if ids.is_empty() {
            return Ok(());
        }
        let kind = DocumentKind::WindowStates;
        self.update(kind, |doc| {
            let states = doc.object_mut(kind.root_key());
            for &id in ids {
                f(id, states.entry(id.key()).or_insert_with(empty_object));
            }
        })
    }

    /// Keeps only the window state blobs for which `keep` returns true.
    /// Returns how many were deleted.
    pub fn retain_window_states(
        &self,
        mut keep: impl FnMut(WindowId) -> bool,
    ) -> Result<usize, StoreError> {
        let kind = DocumentKind::WindowStates;
        let mut removed = 0;
        self.update(kind, |doc| {
            let states = doc.object_mut(kind.root_key());
            let before = states.len();
            // Keys that are not window ids belong to someone else; leave them.
            states.retain(|key, _| WindowId::from_key(key).is_none_or(&mut keep));
            removed = before - states.len();
        })?;
        Ok(removed)
    }

    /// Ids of all windows with a stored state blob.
    pub fn window_state_ids(&self) -> Vec<WindowId> {
        let kind = DocumentKind::WindowStates;
        self.document(kind)
            .object(kind.root_key())
            .map(|states| states.keys().filter_map(|key| WindowId::from_key(key)).collect())
            .unwrap_or_default()
    }

    pub fn layout_state(&self, surface: SurfaceId) -> Value {
        self.entry(DocumentKind::LayoutStates, &surface.to_string()).unwrap_or_else(empty_object)
    }

    pub fn put_layout_state(&self, surface: SurfaceId, blob: Value) -> Result<(), StoreError> {
        let kind = DocumentKind::LayoutStates;
        self.update(kind, |doc| {
            doc.object_mut(kind.root_key()).insert(surface.to_string(), blob);
        })
    }

    /// The persisted window order. Entries that are not window ids are skipped.
    pub fn window_list(&self) -> Vec<WindowId> {
        let kind = DocumentKind::WindowList;
        let doc = self.document(kind);
        let Some(entries) = doc.get(kind.root_key()).and_then(Value::as_array) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Number(n) => n.as_u64().map(WindowId::new),
                Value::String(s) => WindowId::from_key(s),
                _ => None,
            })
            .collect()
    }

    pub fn put_window_list(&self, list: &[WindowId]) -> Result<(), StoreError> {
        let kind = DocumentKind::WindowList;
        let list = Value::Array(list.iter().map(|id| Value::from(id.get())).collect());
        self.update(kind, |doc| doc.set(kind.root_key(), list))
    }

    /// The group shown on `surface`, or `None` if no group is swapped in.
    pub fn surface_group(&self, surface: SurfaceId) -> Option<GroupId> {
        let entry = self.entry(DocumentKind::SurfaceGroups, &surface.to_string())?;
        parse_group(surface, &entry)
    }

    pub fn set_surface_group(
        &self,
        surface: SurfaceId,
        group: Option<GroupId>,
    ) -> Result<(), StoreError> {
        let kind = DocumentKind::SurfaceGroups;
        self.update(kind, |doc| {
            let entry = doc
                .object_mut(kind.root_key())
                .entry(surface.to_string())
                .or_insert_with(empty_object);
            let entry = document::ensure_object(entry);
            match group {
                Some(group) => {
                    entry.insert(GROUP_KEY.to_string(), Value::from(i64::from(group)));
                }
                None => {
                    entry.remove(GROUP_KEY);
                }
            }
        })
    }

    /// Every surface with a group assigned, in document order.
    pub fn surface_groups(&self) -> Vec<(SurfaceId, GroupId)> {
        let kind = DocumentKind::SurfaceGroups;
        let doc = self.document(kind);
        let Some(surfaces) = doc.object(kind.root_key()) else {
            return Vec::new();
        };
        surfaces
            .iter()
            .filter_map(|(key, entry)| {
                let surface = key
                    .parse::<SurfaceId>()
                    .inspect_err(|err| debug!(%err, "skipping surface entry"))
                    .ok()?;
                Some((surface, parse_group(surface, entry)?))
            })
            .collect()
    }
}

fn parse_group(surface: SurfaceId, entry: &Value) -> Option<GroupId> {
    let raw = entry.get(GROUP_KEY)?.as_i64()?;
    // 0 is how "no group" was written historically.
    if raw == 0 {
        return None;
    }
    GroupId::new(raw)
        .inspect_err(|err| warn!(%surface, %err, "ignoring persisted surface group"))
        .ok()
}

pub fn empty_object() -> Value { Value::Object(Map::new()) }
