//! Authentication port and session.
//!
//! `AuthProvider` is the contract for an identity backend (Identity Toolkit
//! in studylife-infra). `AuthSession` wraps a provider, keeps the current
//! identity and notifies subscribers when it changes.

use std::sync::{Arc, Mutex};

use studylife_types::error::AuthError;
use studylife_types::identity::{AuthIdentity, SocialProvider};
use tokio::sync::watch;
use tracing::info;

/// Trait for identity backends.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait AuthProvider: Send + Sync {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthIdentity, AuthError>> + Send;

    /// Create an account and set its display name.
    fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthIdentity, AuthError>> + Send;

    fn sign_in_with(
        &self,
        provider: SocialProvider,
    ) -> impl std::future::Future<Output = Result<AuthIdentity, AuthError>> + Send;

    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}

/// Receives identity changes until dropped or unsubscribed.
pub struct IdentitySubscription {
    rx: watch::Receiver<Option<AuthIdentity>>,
}

impl IdentitySubscription {
    /// Identity at the time of the latest notification.
    pub fn current(&self) -> Option<AuthIdentity> {
        self.rx.borrow().clone()
    }

    /// Wait for the next identity change.
    ///
    /// Returns `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<Option<AuthIdentity>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(self) {}
}

/// The signed-in state of one client.
pub struct AuthSession<P: AuthProvider> {
    provider: P,
    identity: watch::Sender<Option<AuthIdentity>>,
    last_error: Arc<Mutex<Option<AuthError>>>,
}

impl<P: AuthProvider> AuthSession<P> {
    pub fn new(provider: P) -> Self {
        Self::restore(provider, None)
    }

    /// Start a session with a previously persisted identity.
    pub fn restore(provider: P, identity: Option<AuthIdentity>) -> Self {
        let (tx, _) = watch::channel(identity);
        Self {
            provider,
            identity: tx,
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn current(&self) -> Option<AuthIdentity> {
        self.identity.borrow().clone()
    }

    pub fn subscribe(&self) -> IdentitySubscription {
        IdentitySubscription {
            rx: self.identity.subscribe(),
        }
    }

    /// The user-facing message of the last failed attempt, if any.
    pub fn last_error_message(&self) -> Option<&'static str> {
        self.last_error
            .lock()
            .ok()
            .and_then(|e| e.as_ref().map(AuthError::user_message))
            .filter(|msg| !msg.is_empty())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return self.fail(AuthError::MissingFields);
        }
        let result = self.provider.sign_in(email.trim(), password).await;
        self.settle(result)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthIdentity, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return self.fail(AuthError::MissingFields);
        }
        let result = self
            .provider
            .register(name.trim(), email.trim(), password)
            .await;
        self.settle(result)
    }

    pub async fn sign_in_with(&self, provider: SocialProvider) -> Result<AuthIdentity, AuthError> {
        let result = self.provider.sign_in_with(provider).await;
        self.settle(result)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        self.identity.send_replace(None);
        info!("Signed out");
        Ok(())
    }

    fn settle(&self, result: Result<AuthIdentity, AuthError>) -> Result<AuthIdentity, AuthError> {
        match result {
            Ok(identity) => {
                if let Ok(mut last) = self.last_error.lock() {
                    *last = None;
                }
                info!(user_id = %identity.id, "Signed in");
                self.identity.send_replace(Some(identity.clone()));
                Ok(identity)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail<T>(&self, error: AuthError) -> Result<T, AuthError> {
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(error.clone());
        }
        Err(error)
    }
}
