use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DocumentStore, Revision, StoreError, merge_fields, random_token};

/// Adapter that keeps one JSON file per user under a base directory.
///
/// The revision travels inside the file so guarded writes survive process
/// restarts. Writes go through a temp file rename to avoid torn documents.
pub struct FileStore {
    base_dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    revision: u64,
    document: Value,
}

impl FileStore {
    /// Creates a store rooted at `base_dir`. The directory must exist.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn document_path(&self, user_id: &str) -> PathBuf {
        self.base_dir.join(format!("{user_id}.json"))
    }

    fn read_envelope(&self, user_id: &str) -> Result<Envelope, StoreError> {
        let path = self.document_path(user_id);
        if !path.exists() {
            return Err(StoreError::DocumentNotFound);
        }
        let data =
            std::fs::read_to_string(&path).map_err(|e| StoreError::Backend(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn write_envelope(&self, user_id: &str, envelope: &Envelope) -> Result<(), StoreError> {
        let data =
            serde_json::to_string_pretty(envelope).map_err(|e| StoreError::Backend(e.to_string()))?;
        let path = self.document_path(user_id);
        let tmp = self.base_dir.join(format!("{user_id}.json.tmp"));
        std::fs::write(&tmp, data).map_err(|e| StoreError::Backend(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl DocumentStore for FileStore {
    fn get(&self, user_id: &str) -> Result<(Value, Revision), StoreError> {
        let envelope = self.read_envelope(user_id)?;
        Ok((envelope.document, Revision(envelope.revision)))
    }

    fn set(&mut self, user_id: &str, document: &Value) -> Result<Revision, StoreError> {
        let revision = match self.read_envelope(user_id) {
            Ok(envelope) => envelope.revision + 1,
            Err(StoreError::DocumentNotFound) => 1,
            Err(err) => return Err(err),
        };
        self.write_envelope(
            user_id,
            &Envelope {
                revision,
                document: document.clone(),
            },
        )?;
        Ok(Revision(revision))
    }

    fn update(
        &mut self,
        user_id: &str,
        fields: Map<String, Value>,
        guard: Revision,
    ) -> Result<Revision, StoreError> {
        let mut envelope = self.read_envelope(user_id)?;
        if envelope.revision != guard.0 {
            return Err(StoreError::RevisionConflict);
        }
        merge_fields(&mut envelope.document, fields)?;
        envelope.revision += 1;
        self.write_envelope(user_id, &envelope)?;
        Ok(Revision(envelope.revision))
    }

    fn delete(&mut self, user_id: &str) -> Result<(), StoreError> {
        let path = self.document_path(user_id);
        if !path.exists() {
            return Err(StoreError::DocumentNotFound);
        }
        std::fs::remove_file(&path).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn allocate_id(&self) -> String {
        random_token()
    }
}
