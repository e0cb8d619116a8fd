use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{DocumentStore, Revision, StoreError, merge_fields, random_token};

/// In-memory document store used in tests and as the reference adapter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, (Value, u64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, user_id: &str) -> Result<(Value, Revision), StoreError> {
        match self.documents.get(user_id) {
            Some((document, revision)) => Ok((document.clone(), Revision(*revision))),
            None => Err(StoreError::DocumentNotFound),
        }
    }

    fn set(&mut self, user_id: &str, document: &Value) -> Result<Revision, StoreError> {
        let revision = self
            .documents
            .get(user_id)
            .map(|(_, revision)| revision + 1)
            .unwrap_or(1);
        self.documents
            .insert(user_id.to_string(), (document.clone(), revision));
        Ok(Revision(revision))
    }

    fn update(
        &mut self,
        user_id: &str,
        fields: Map<String, Value>,
        guard: Revision,
    ) -> Result<Revision, StoreError> {
        let (document, revision) = self
            .documents
            .get_mut(user_id)
            .ok_or(StoreError::DocumentNotFound)?;
        if *revision != guard.0 {
            return Err(StoreError::RevisionConflict);
        }
        merge_fields(document, fields)?;
        *revision += 1;
        Ok(Revision(*revision))
    }

    fn delete(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.documents
            .remove(user_id)
            .map(|_| ())
            .ok_or(StoreError::DocumentNotFound)
    }

    fn allocate_id(&self) -> String {
        random_token()
    }
}
