//! SQLite profile store.
//!
//! Implements `ProfileStore` from `studylife-core`. Each profile field is a
//! row keyed by `(user_id, field)` holding the field's JSON, so a save only
//! touches the fields it carries.

use chrono::{DateTime, Utc};
use sqlx::Row;
use studylife_core::storage::profile_store::ProfileStore;
use studylife_types::error::RepositoryError;
use studylife_types::profile::{FieldValue, ProfileField, ProfileFields};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ProfileStore`.
pub struct SqliteProfileStore {
    pool: DatabasePool,
}

impl SqliteProfileStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// When any field of the user's document was last written.
    pub async fn last_updated(&self, user_id: &str) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let row = sqlx::query("SELECT MAX(updated_at) AS updated_at FROM profile_fields WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let updated_at: Option<String> = row
            .try_get("updated_at")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        updated_at.as_deref().map(parse_datetime).transpose()
    }
}

struct FieldRow {
    field: String,
    value: String,
}

impl FieldRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            field: row.try_get("field")?,
            value: row.try_get("value")?,
        })
    }

    /// `None` for rows written under a field name this build doesn't know.
    fn into_value(self) -> Result<Option<FieldValue>, RepositoryError> {
        let Ok(field) = self.field.parse::<ProfileField>() else {
            tracing::debug!(field = %self.field, "Skipping unknown profile field");
            return Ok(None);
        };
        let json: serde_json::Value = serde_json::from_str(&self.value)
            .map_err(|e| RepositoryError::Query(format!("invalid JSON value: {e}")))?;
        FieldValue::from_json(field, json)
            .map(Some)
            .map_err(|e| RepositoryError::Query(format!("invalid {field} value: {e}")))
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl ProfileStore for SqliteProfileStore {
    async fn save(&self, user_id: &str, fields: &ProfileFields) -> Result<(), RepositoryError> {
        if fields.is_empty() {
            return Ok(());
        }
        let now = format_datetime(&Utc::now());

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for value in fields.values() {
            let json = value
                .to_json()
                .map_err(|e| RepositoryError::Query(format!("failed to serialize value: {e}")))?;
            sqlx::query(
                r#"INSERT INTO profile_fields (user_id, field, value, updated_at)
                   VALUES (?, ?, ?, ?)
                   ON CONFLICT(user_id, field) DO UPDATE SET
                       value = excluded.value,
                       updated_at = excluded.updated_at"#,
            )
            .bind(user_id)
            .bind(value.field().key())
            .bind(json.to_string())
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        tracing::debug!(user_id, fields = ?fields.fields(), "Profile fields saved");
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<ProfileFields>, RepositoryError> {
        let rows = sqlx::query("SELECT field, value FROM profile_fields WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut document = ProfileFields::default();
        for row in &rows {
            let row = FieldRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            if let Some(value) = row.into_value()? {
                document.insert(value);
            }
        }
        Ok(Some(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studylife_types::chat::ChatMessage;
    use studylife_types::task::{StudyTask, TaskPriority};

    async fn test_store() -> (SqliteProfileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteProfileStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_load_missing_document_is_none() {
        let (store, _dir) = test_store().await;
        assert_eq!(store.load("nobody").await.unwrap(), None);
        assert_eq!(store.last_updated("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (store, _dir) = test_store().await;
        let fields = ProfileFields::default()
            .with(FieldValue::Name("Ada".into()))
            .with(FieldValue::SleepHours(7.5))
            .with(FieldValue::Tasks(vec![StudyTask {
                id: 1,
                title: "Revise graphs".into(),
                priority: TaskPriority::High,
                completed: false,
            }]))
            .with(FieldValue::ChatHistory(vec![ChatMessage::user("hello")]));

        store.save("u1", &fields).await.unwrap();

        assert_eq!(store.load("u1").await.unwrap(), Some(fields));
        assert!(store.last_updated("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_merges_fields() {
        let (store, _dir) = test_store().await;
        store
            .save(
                "u1",
                &ProfileFields::default()
                    .with(FieldValue::Name("Ada".into()))
                    .with(FieldValue::SleepHours(6.0)),
            )
            .await
            .unwrap();
        store
            .save("u1", &ProfileFields::default().with(FieldValue::SleepHours(8.0)))
            .await
            .unwrap();

        let loaded = store.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded.name.as_deref(), Some("Ada"));
        assert_eq!(loaded.sleep_hours, Some(8.0));
        assert!(loaded.tasks.is_none());
    }

    #[tokio::test]
    async fn test_documents_are_per_user() {
        let (store, _dir) = test_store().await;
        store
            .save("u1", &ProfileFields::default().with(FieldValue::Email("a@uni.edu".into())))
            .await
            .unwrap();
        assert_eq!(store.load("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_field_rows_are_skipped() {
        let (store, _dir) = test_store().await;
        sqlx::query("INSERT INTO profile_fields (user_id, field, value, updated_at) VALUES ('u1', 'legacy', '1', ?)")
            .bind(format_datetime(&Utc::now()))
            .execute(&store.pool.writer)
            .await
            .unwrap();
        assert_eq!(store.load("u1").await.unwrap(), Some(ProfileFields::default()));
    }
}
