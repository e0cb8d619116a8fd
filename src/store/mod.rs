//! Adapters for the external document store keyed by user id.

pub mod file;
pub mod memory;

use serde_json::{Map, Value};
use uuid::Uuid;

/// Monotonic revision token attached to every stored document.
///
/// Guarded writes compare it against the revision the caller read, turning the
/// lost-update race between two concurrent read-modify-write cycles into a
/// reportable [`StoreError::RevisionConflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Revision(pub u64);

/// Errors that can occur when interacting with a document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document exists for the requested user id.
    DocumentNotFound,
    /// A guarded write observed a newer revision than the caller read.
    RevisionConflict,
    /// The backend failed (I/O, serialization, connectivity).
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DocumentNotFound => write!(f, "document not found"),
            StoreError::RevisionConflict => write!(f, "document revision conflict"),
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Abstraction over a document database holding one document per user.
///
/// Documents are schema-less JSON values; the service layer owns the typed
/// view. `update` merges top-level fields so a caller can rewrite one embedded
/// collection without touching the rest of the document.
pub trait DocumentStore {
    /// Returns the document stored for `user_id` and its current revision.
    fn get(&self, user_id: &str) -> Result<(Value, Revision), StoreError>;

    /// Creates or replaces the document for `user_id` unconditionally.
    fn set(&mut self, user_id: &str, document: &Value) -> Result<Revision, StoreError>;

    /// Merges the given top-level fields into the document.
    ///
    /// The write only applies while the document is still at `guard`; it fails
    /// with [`StoreError::RevisionConflict`] when the document changed since
    /// the caller read it.
    fn update(
        &mut self,
        user_id: &str,
        fields: Map<String, Value>,
        guard: Revision,
    ) -> Result<Revision, StoreError>;

    /// Removes the document for `user_id`.
    fn delete(&mut self, user_id: &str) -> Result<(), StoreError>;

    /// Allocates a unique opaque token suitable for embedded entity ids.
    fn allocate_id(&self) -> String;
}

pub(crate) fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub(crate) fn merge_fields(
    document: &mut Value,
    fields: Map<String, Value>,
) -> Result<(), StoreError> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| StoreError::Backend("stored document is not an object".to_string()))?;
    for (key, value) in fields {
        object.insert(key, value);
    }
    Ok(())
}
