use serde_json::{Map, Value};
use tracing::{trace, warn};

use super::StoreError;
use super::backend::{DocumentBackend, DocumentKind};

/// One persisted JSON document, held for a single read-modify-write cycle.
///
/// Keys this crate does not know about (written by a differently configured
/// sibling process) are carried through untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    /// Loads `kind`, substituting an empty document when it is missing,
    /// unreadable or not a JSON object. The stored bytes are never touched here.
    pub fn load(backend: &dyn DocumentBackend, kind: DocumentKind) -> Self {
        match backend.read(kind) {
            Ok(None) => Self::default(),
            Ok(Some(bytes)) => Self::parse(&bytes).unwrap_or_else(|| {
                warn!(document = %kind, "persisted document is malformed; starting from an empty one");
                Self::default()
            }),
            Err(err) => {
                warn!(document = %kind, %err, "failed to read persisted document");
                Self::default()
            }
        }
    }

    fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Some(Self::default());
        }
        match serde_json::from_slice(bytes) {
            Ok(Value::Object(root)) => Some(Self { root }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.root.get(key) }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.root.get(key).and_then(Value::as_object)
    }

    /// The object stored under `key`, created (or replacing a non-object) if needed.
    pub fn object_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        ensure_object(self.root.entry(key).or_insert_with(|| Value::Object(Map::new())))
    }

    pub fn set(&mut self, key: &str, value: Value) { self.root.insert(key.to_string(), value); }

    pub fn store(&self, backend: &dyn DocumentBackend, kind: DocumentKind) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&self.root)
            .map_err(|source| StoreError::Encode { document: kind, source })?;
        backend
            .replace(kind, &bytes)
            .map_err(|source| StoreError::Write { document: kind, source })?;
        trace!(document = %kind, bytes = bytes.len(), "document written");
        Ok(())
    }
}

/// Turns `value` into an object if it is not one already and returns it.
pub(super) fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let Value::Object(map) = value else {
        unreachable!("value was just replaced by an object");
    };
    map
}
