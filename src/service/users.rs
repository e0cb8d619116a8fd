//! User record endpoints: signup, profile reads and updates, deletion.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{Service, ServiceError, Session};
use crate::core::User;
use crate::store::DocumentStore;

/// Profile fields supplied on signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Partial profile update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDeleted {
    pub message: String,
    pub uid: String,
}

impl<S: DocumentStore> Service<S> {
    /// Creates the caller's record with empty collections.
    pub fn create_user(
        &self,
        session: &Session,
        profile: NewUser,
    ) -> Result<UserResponse, ServiceError> {
        let uid = session.uid()?;
        let user = User::new(uid, profile.name, profile.email, profile.phone);
        let document =
            serde_json::to_value(&user).map_err(|e| ServiceError::Internal(e.to_string()))?;
        {
            let mut store = self.store.lock().expect("store mutex poisoned");
            store.set(uid, &document)?;
        }
        tracing::info!(uid, "user record created");
        Ok(UserResponse {
            message: "user created".to_string(),
            user,
        })
    }

    pub fn get_user(&self, session: &Session) -> Result<UserResponse, ServiceError> {
        let uid = session.uid()?;
        let (user, _) = self.load_user(uid)?;
        Ok(UserResponse {
            message: "user found".to_string(),
            user,
        })
    }

    /// Merges the supplied profile fields over the stored record.
    pub fn update_user(
        &self,
        session: &Session,
        patch: UserPatch,
    ) -> Result<UserResponse, ServiceError> {
        let uid = session.uid()?;
        let (mut user, revision) = self.load_user(uid)?;
        let mut fields = Map::new();
        if let Some(name) = patch.name {
            fields.insert("name".to_string(), serde_json::Value::String(name.clone()));
            user.name = name;
        }
        if let Some(email) = patch.email {
            fields.insert("email".to_string(), serde_json::Value::String(email.clone()));
            user.email = email;
        }
        if let Some(phone) = patch.phone {
            fields.insert("phone".to_string(), serde_json::Value::String(phone.clone()));
            user.phone = phone;
        }
        if !fields.is_empty() {
            let mut store = self.store.lock().expect("store mutex poisoned");
            store.update(uid, fields, revision)?;
        }
        Ok(UserResponse {
            message: "user updated".to_string(),
            user,
        })
    }

    /// Deletes the whole record; embedded entities cascade with it.
    pub fn delete_user(&self, session: &Session) -> Result<UserDeleted, ServiceError> {
        let uid = session.uid()?;
        {
            let mut store = self.store.lock().expect("store mutex poisoned");
            store.delete(uid)?;
        }
        tracing::info!(uid, "user record deleted");
        Ok(UserDeleted {
            message: "user deleted".to_string(),
            uid: uid.to_string(),
        })
    }
}
