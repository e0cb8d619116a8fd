//! Authenticated endpoint operations over the per-user document.
//!
//! [`Service`] is constructed once at process start around an explicit store
//! client and passed to the transport layer; nothing in here reaches for
//! global state. Public operations take a [`Session`] and fail with
//! [`ServiceError::Unauthenticated`] for anonymous callers; internally
//! composed operations take the caller identity as a plain argument instead.

pub mod accounts;
pub mod categories;
pub mod tasks;
pub mod transactions;
pub mod users;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::User;
use crate::store::{DocumentStore, Revision, StoreError};

/// Verified identity of a caller, produced by the external authentication
/// layer before any operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uid: String,
}

/// Outcome of the external authentication check for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(Caller),
    Anonymous,
}

impl Session {
    pub fn authenticated(uid: impl Into<String>) -> Self {
        Session::Authenticated(Caller { uid: uid.into() })
    }

    /// The verified caller id, or `Unauthenticated` for anonymous sessions.
    pub fn uid(&self) -> Result<&str, ServiceError> {
        match self {
            Session::Authenticated(caller) => Ok(&caller.uid),
            Session::Anonymous => Err(ServiceError::Unauthenticated),
        }
    }
}

/// Structured error surfaced to callers as a (kind, message) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No verified caller identity was supplied.
    Unauthenticated,
    /// A required field is missing or malformed.
    InvalidArgument(String),
    /// The user record, account, transaction, task or category is absent.
    NotFound(String),
    /// A uniqueness constraint was violated.
    AlreadyExists(String),
    /// The store failed; the underlying cause is wrapped, never exposed raw.
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable kind, mirrored in error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated => "unauthenticated",
            ServiceError::InvalidArgument(_) => "invalid-argument",
            ServiceError::NotFound(_) => "not-found",
            ServiceError::AlreadyExists(_) => "already-exists",
            ServiceError::Internal(_) => "internal",
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Unauthenticated => write!(f, "caller is not authenticated"),
            ServiceError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ServiceError::NotFound(msg) => write!(f, "not found: {msg}"),
            ServiceError::AlreadyExists(msg) => write!(f, "already exists: {msg}"),
            ServiceError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DocumentNotFound => {
                ServiceError::NotFound("user record not found".to_string())
            }
            StoreError::RevisionConflict => ServiceError::Internal(
                "user document was modified concurrently; retry the operation".to_string(),
            ),
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

/// Payload that accepts either a single item or a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Endpoint operations bound to one document store client.
pub struct Service<S: DocumentStore> {
    store: Mutex<S>,
}

impl<S: DocumentStore> Service<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub(crate) fn allocate_id(&self) -> String {
        self.store.lock().expect("store mutex poisoned").allocate_id()
    }

    /// Loads and deserializes the caller's document.
    pub(crate) fn load_user(&self, uid: &str) -> Result<(User, Revision), ServiceError> {
        let (document, revision) = {
            let store = self.store.lock().expect("store mutex poisoned");
            store.get(uid)?
        };
        let user = serde_json::from_value(document)
            .map_err(|e| ServiceError::Internal(format!("malformed user document: {e}")))?;
        Ok((user, revision))
    }

    /// Rewrites one top-level collection field, guarded by the revision the
    /// caller observed at load time.
    pub(crate) fn write_field<T: Serialize>(
        &self,
        uid: &str,
        field: &str,
        value: &T,
        guard: Revision,
    ) -> Result<Revision, ServiceError> {
        let value =
            serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))?;
        let mut fields = Map::new();
        fields.insert(field.to_string(), value);
        let mut store = self.store.lock().expect("store mutex poisoned");
        Ok(store.update(uid, fields, guard)?)
    }
}
