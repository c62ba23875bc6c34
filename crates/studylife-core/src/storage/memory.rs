use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use studylife_types::error::RepositoryError;
use studylife_types::profile::ProfileFields;

use super::profile_store::ProfileStore;

/// In-process profile store with merge semantics.
///
/// Cloning shares the underlying map, so a test can hand one clone to a
/// workspace and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    documents: Arc<Mutex<HashMap<String, ProfileFields>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored document.
    pub fn document(&self, user_id: &str) -> Option<ProfileFields> {
        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(user_id).cloned())
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn save(&self, user_id: &str, fields: &ProfileFields) -> Result<(), RepositoryError> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        docs.entry(user_id.to_string())
            .or_default()
            .merge(fields.clone());
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<ProfileFields>, RepositoryError> {
        let docs = self
            .documents
            .lock()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(docs.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studylife_types::profile::FieldValue;

    #[tokio::test]
    async fn load_missing_document_returns_none() {
        let store = MemoryProfileStore::new();
        assert!(store.load("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_merges_fields() {
        let store = MemoryProfileStore::new();
        store
            .save(
                "u1",
                &ProfileFields::default().with(FieldValue::Name("Ada".into())),
            )
            .await
            .unwrap();
        store
            .save(
                "u1",
                &ProfileFields::default().with(FieldValue::SleepHours(8.0)),
            )
            .await
            .unwrap();

        let doc = store.load("u1").await.unwrap().unwrap();
        assert_eq!(doc.name.as_deref(), Some("Ada"));
        assert_eq!(doc.sleep_hours, Some(8.0));
        assert!(doc.tasks.is_none());
    }

    #[tokio::test]
    async fn clones_share_documents() {
        let store = MemoryProfileStore::new();
        let other = store.clone();
        store
            .save(
                "u1",
                &ProfileFields::default().with(FieldValue::Email("a@b.c".into())),
            )
            .await
            .unwrap();
        assert!(other.document("u1").is_some());
    }
}
