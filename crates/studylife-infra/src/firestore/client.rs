//! FirestoreProfileStore -- `ProfileStore` over the Firestore REST API.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};

use studylife_core::storage::profile_store::ProfileStore;
use studylife_types::error::RepositoryError;
use studylife_types::profile::{FieldValue, ProfileField, ProfileFields};

use super::value::{decode_fields, encode_fields};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

/// Profile documents stored at `users/{uid}` in a Firestore project.
pub struct FirestoreProfileStore {
    client: reqwest::Client,
    api_key: SecretString,
    project_id: String,
    base_url: String,
}

impl FirestoreProfileStore {
    pub fn new(project_id: impl Into<String>, api_key: SecretString) -> Result<Self, RepositoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RepositoryError::Remote(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            project_id: project_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (emulator or proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `users/{uid}` document URL. The id is appended as one
    /// percent-encoded path segment.
    fn document_url(&self, user_id: &str) -> Result<reqwest::Url, RepositoryError> {
        validate_document_id(user_id)?;
        let collection = format!(
            "{}/v1/projects/{}/databases/(default)/documents/users",
            self.base_url, self.project_id
        );
        let mut url = reqwest::Url::parse(&collection)
            .map_err(|e| RepositoryError::Remote(format!("invalid Firestore URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| RepositoryError::Remote("Firestore URL cannot take a path".into()))?
            .push(user_id);
        Ok(url)
    }
}

/// Firestore document ids must be non-empty, at most 1500 bytes, free of
/// `/`, not `.` or `..`, and not of the reserved `__name__` form.
fn validate_document_id(user_id: &str) -> Result<(), RepositoryError> {
    let reserved = user_id.len() >= 4 && user_id.starts_with("__") && user_id.ends_with("__");
    if user_id.is_empty()
        || user_id.len() > 1500
        || user_id.contains('/')
        || user_id == "."
        || user_id == ".."
        || reserved
    {
        return Err(RepositoryError::Query(format!("invalid user id for Firestore: {user_id:?}")));
    }
    Ok(())
}

/// Build the update mask and PATCH body for a partial document.
pub(crate) fn document_patch(fields: &ProfileFields) -> Result<(Vec<&'static str>, Value), RepositoryError> {
    let mut mask = Vec::new();
    let mut map = Map::new();
    for value in fields.values() {
        let key = value.field().key();
        let json = value
            .to_json()
            .map_err(|e| RepositoryError::Query(format!("failed to serialize {key}: {e}")))?;
        mask.push(key);
        map.insert(key.to_string(), json);
    }
    Ok((mask, json!({ "fields": encode_fields(&map) })))
}

/// Decode a Firestore document into the known profile fields.
///
/// Unknown keys are ignored; a known key whose value has the wrong shape is
/// an error.
pub(crate) fn parse_document(document: &Value) -> Result<ProfileFields, RepositoryError> {
    let decoded = document
        .get("fields")
        .and_then(Value::as_object)
        .map(decode_fields)
        .unwrap_or_default();

    let mut profile = ProfileFields::default();
    for (key, value) in decoded {
        let Ok(field) = key.parse::<ProfileField>() else {
            continue;
        };
        let value = FieldValue::from_json(field, value)
            .map_err(|e| RepositoryError::Query(format!("invalid {field} value: {e}")))?;
        profile.insert(value);
    }
    Ok(profile)
}

fn remote_error(status: reqwest::StatusCode, body: &str) -> RepositoryError {
    RepositoryError::Remote(format!("HTTP {status}: {body}"))
}

impl ProfileStore for FirestoreProfileStore {
    async fn save(&self, user_id: &str, fields: &ProfileFields) -> Result<(), RepositoryError> {
        if fields.is_empty() {
            return Ok(());
        }
        let (mask, body) = document_patch(fields)?;
        let mut query: Vec<(&str, &str)> = mask.iter().map(|k| ("updateMask.fieldPaths", *k)).collect();
        query.push(("key", self.api_key.expose_secret()));

        let response = self
            .client
            .patch(self.document_url(user_id)?)
            .query(&query)
            .json(&body)
            .send()
            .await
            .map_err(|e| RepositoryError::Remote(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &error_body));
        }
        tracing::debug!(user_id, fields = ?mask, "Profile fields saved to Firestore");
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<ProfileFields>, RepositoryError> {
        let response = self
            .client
            .get(self.document_url(user_id)?)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| RepositoryError::Remote(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &error_body));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| RepositoryError::Remote(format!("invalid document: {e}")))?;
        parse_document(&document).map(Some)
    }
}
