use thiserror::Error;

/// Errors from repository operations (used by trait definitions in studylife-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from authentication operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing required fields")]
    MissingFields,

    #[error("email already in use")]
    EmailInUse,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("weak password")]
    WeakPassword,

    #[error("account exists with a different sign-in method")]
    AccountExistsWithDifferentCredential,

    #[error("sign-in cancelled by user")]
    Cancelled,

    #[error("unsupported sign-in method: {0}")]
    Unsupported(String),

    #[error("auth provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Message shown to the user on the auth screen.
    ///
    /// `Cancelled` maps to an empty string: closing the popup is not an error
    /// worth showing.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MissingFields => "Please fill in all fields.",
            AuthError::EmailInUse => "This email is already registered. Please sign in.",
            AuthError::InvalidCredentials => "Invalid email or password. Please try again.",
            AuthError::WeakPassword => "Password is too weak. Must be at least 6 characters.",
            AuthError::AccountExistsWithDifferentCredential => {
                "An account already exists with this email address. Please sign in with your original method."
            }
            AuthError::Cancelled => "",
            AuthError::Unsupported(_) => "Social login failed. Please try again.",
            AuthError::Provider(_) => "Authentication failed. Please try again.",
        }
    }
}

/// Errors from speech services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech service unavailable")]
    Unavailable,

    #[error("speech feature disabled for this session")]
    Disabled,

    #[error("could not start speech service: {0}")]
    StartFailed(String),

    #[error("speech recognition error: {0}")]
    Recognition(String),

    #[error("speech synthesis error: {0}")]
    Synthesis(String),
}

/// Errors from workspace operations that the caller must handle.
///
/// Most workspace failures are recovered locally (notices, inline messages);
/// only input validation surfaces here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkspaceError {
    #[error("sleep hours must be between 0 and 24, got {0}")]
    InvalidSleepHours(f64),

    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("task title must not be empty")]
    EmptyTaskTitle,

    #[error("no task ids left")]
    TaskIdsExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_auth_error_user_messages() {
        assert_eq!(
            AuthError::EmailInUse.user_message(),
            "This email is already registered. Please sign in."
        );
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Invalid email or password. Please try again."
        );
        assert!(AuthError::Cancelled.user_message().is_empty());
    }

    #[test]
    fn test_workspace_error_display() {
        let err = WorkspaceError::InvalidSleepHours(30.0);
        assert!(err.to_string().contains("30"));
        assert_eq!(WorkspaceError::TaskNotFound(7).to_string(), "task 7 not found");
    }
}
