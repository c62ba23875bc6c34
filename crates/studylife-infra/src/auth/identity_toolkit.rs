//! Firebase Identity Toolkit REST authentication.
//!
//! Email/password sign-in and registration go through
//! `identitytoolkit.googleapis.com/v1/accounts:*`. Social (popup) sign-in
//! needs a browser and is reported as unsupported. Tokens returned by the
//! service are used for the registration display-name update and then
//! dropped.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use studylife_core::auth::AuthProvider;
use studylife_types::error::AuthError;
use studylife_types::identity::{AuthIdentity, SocialProvider};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Email/password auth against Firebase Identity Toolkit.
pub struct IdentityToolkitAuth {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl AccountResponse {
    fn identity(&self) -> AuthIdentity {
        AuthIdentity {
            id: self.local_id.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map an Identity Toolkit error message to an [`AuthError`].
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be
/// at least 6 characters`; only the code before ` : ` is significant.
pub(crate) fn map_error_code(message: &str) -> AuthError {
    let code = message.split(" : ").next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_EMAIL" => {
            AuthError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "MISSING_PASSWORD" | "MISSING_EMAIL" => AuthError::MissingFields,
        "FEDERATED_USER_ID_ALREADY_LINKED" => AuthError::AccountExistsWithDifferentCredential,
        _ => AuthError::Provider(message.to_string()),
    }
}

impl IdentityToolkitAuth {
    pub fn new(api_key: SecretString) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::Provider(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (Auth emulator).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn call<B: Serialize>(&self, method: &str, body: &B) -> Result<AccountResponse, AuthError> {
        let url = format!("{}/v1/accounts:{method}", self.base_url);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<ErrorEnvelope>(&error_body)
                .map(|e| map_error_code(&e.error.message))
                .unwrap_or_else(|_| AuthError::Provider(format!("HTTP {status}: {error_body}")));
            tracing::debug!(method, %status, error = %error, "Identity Toolkit call failed");
            return Err(error);
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("invalid response: {e}")))
    }
}

impl AuthProvider for IdentityToolkitAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AuthError> {
        let account = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(account.identity())
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthIdentity, AuthError> {
        let account = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let mut identity = account.identity();
        let Some(id_token) = account.id_token.as_deref() else {
            tracing::warn!(user_id = %identity.id, "signUp returned no token, display name not set");
            return Ok(identity);
        };

        // The account already exists; keep it even if the name update fails.
        match self
            .call(
                "update",
                &UpdateRequest {
                    id_token,
                    display_name: name,
                    return_secure_token: false,
                },
            )
            .await
        {
            Ok(_) => identity.display_name = Some(name.to_string()),
            Err(e) => tracing::warn!(user_id = %identity.id, error = %e, "Failed to set display name"),
        }
        Ok(identity)
    }

    async fn sign_in_with(&self, provider: SocialProvider) -> Result<AuthIdentity, AuthError> {
        Err(AuthError::Unsupported(provider.to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
