//! Runtime selection of the profile store.
//!
//! `ProfileStore` uses RPITIT and is not object-safe, so the configured
//! backend is wrapped in an enum that dispatches by match.

use std::path::Path;

use chrono::{DateTime, Utc};

use secrecy::SecretString;
use studylife_core::storage::profile_store::ProfileStore;
use studylife_types::config::{StorageBackend, StorageConfig};
use studylife_types::error::RepositoryError;
use studylife_types::profile::ProfileFields;

use crate::filesystem::database_url;
use crate::firestore::FirestoreProfileStore;
use crate::sqlite::pool::DatabasePool;
use crate::sqlite::profile::SqliteProfileStore;

/// The configured profile store.
pub enum ProfileBackend {
    Sqlite(SqliteProfileStore),
    Firestore(FirestoreProfileStore),
}

impl ProfileBackend {
    pub fn kind(&self) -> StorageBackend {
        match self {
            ProfileBackend::Sqlite(_) => StorageBackend::Sqlite,
            ProfileBackend::Firestore(_) => StorageBackend::Firestore,
        }
    }

    /// When the user's document was last written. Firestore does not
    /// report this through the fields API, so it is always `None` there.
    pub async fn last_saved(&self, user_id: &str) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        match self {
            ProfileBackend::Sqlite(store) => store.last_updated(user_id).await,
            ProfileBackend::Firestore(_) => Ok(None),
        }
    }
}

/// Open the store named by `config`.
///
/// Firestore needs both a project id and the Firebase API key; the SQLite
/// database lives in `data_dir`.
pub async fn open_profile_store(
    config: &StorageConfig,
    data_dir: &Path,
    firebase_key: Option<SecretString>,
) -> Result<ProfileBackend, RepositoryError> {
    match config.backend {
        StorageBackend::Sqlite => {
            tokio::fs::create_dir_all(data_dir)
                .await
                .map_err(|e| RepositoryError::Query(format!("cannot create {}: {e}", data_dir.display())))?;
            let pool = DatabasePool::new(&database_url(data_dir)).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to open profile database");
                RepositoryError::Connection
            })?;
            Ok(ProfileBackend::Sqlite(SqliteProfileStore::new(pool)))
        }
        StorageBackend::Firestore => {
            let project = config
                .firestore_project_id
                .clone()
                .ok_or_else(|| RepositoryError::Remote("storage.firestore_project_id is not set".into()))?;
            let key = firebase_key
                .ok_or_else(|| RepositoryError::Remote("FIREBASE_API_KEY is not set".into()))?;
            Ok(ProfileBackend::Firestore(FirestoreProfileStore::new(project, key)?))
        }
    }
}

impl ProfileStore for ProfileBackend {
    async fn save(&self, user_id: &str, fields: &ProfileFields) -> Result<(), RepositoryError> {
        match self {
            ProfileBackend::Sqlite(store) => store.save(user_id, fields).await,
            ProfileBackend::Firestore(store) => store.save(user_id, fields).await,
        }
    }

    async fn load(&self, user_id: &str) -> Result<Option<ProfileFields>, RepositoryError> {
        match self {
            ProfileBackend::Sqlite(store) => store.load(user_id).await,
            ProfileBackend::Firestore(store) => store.load(user_id).await,
        }
    }
}
