//! In-memory `ProfileStore` for handler tests.
use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::repos::{
    error::RepoError,
    profile_repo::{NewProfile, ProfilePatch, ProfileRecord, ProfileStore},
};

#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    rows: Arc<Mutex<HashMap<Uuid, ProfileRecord>>>,
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, id: Uuid) -> Result<ProfileRecord, RepoError> {
        self.rows
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, profile: NewProfile) -> Result<ProfileRecord, RepoError> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&profile.id) {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now();
        let record = ProfileRecord {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            native_language: profile.native_language,
            avatar: profile.avatar,
            settings: profile.settings,
            created_at: now,
            updated_at: now,
        };
        rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<ProfileRecord, RepoError> {
        let mut rows = self.rows.lock().await;
        let record = rows.get_mut(&id).ok_or(RepoError::NotFound)?;

        if let Some(v) = patch.first_name {
            record.first_name = v;
        }
        if let Some(v) = patch.last_name {
            record.last_name = v;
        }
        if let Some(v) = patch.native_language {
            record.native_language = v;
        }
        if let Some(v) = patch.avatar {
            record.avatar = v;
        }
        if let Some(v) = patch.settings {
            record.settings = v;
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_profile(id: Uuid) -> NewProfile {
        NewProfile {
            id,
            first_name: Some("Ada".into()),
            last_name: None,
            native_language: Some("en".into()),
            avatar: None,
            settings: json!({}),
        }
    }

    #[tokio::test]
    async fn create_get_update() {
        let store = MemoryProfileStore::default();
        let id = Uuid::new_v4();

        store.create(new_profile(id)).await.unwrap();
        assert!(matches!(
            store.create(new_profile(id)).await,
            Err(RepoError::Conflict)
        ));

        let updated = store
            .update(
                id,
                ProfilePatch {
                    first_name: Some(None),
                    last_name: Some(Some("Lovelace".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, None);
        assert_eq!(updated.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(updated.native_language.as_deref(), Some("en"));

        assert_eq!(store.get(id).await.unwrap(), updated);
        assert!(matches!(
            store.get(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }
}
