//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::Json;
use axum::response::{IntoResponse, Response};

use studylife_types::error::WorkspaceError;
use studylife_types::llm::LlmError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Workspace(WorkspaceError),
    /// Generative text service failure.
    Assistant(LlmError),
    /// No open workspace for the user.
    WorkspaceNotFound(String),
    Validation(String),
    Internal(String),
}

impl From<WorkspaceError> for AppError {
    fn from(e: WorkspaceError) -> Self {
        AppError::Workspace(e)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Assistant(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Workspace(WorkspaceError::TaskNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "TASK_NOT_FOUND",
                format!("Task {id} not found"),
            ),
            AppError::Workspace(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Assistant(LlmError::RateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "ASSISTANT_RATE_LIMITED",
                "The assistant is busy. Please try again shortly.".to_string(),
            ),
            AppError::Assistant(e) => (StatusCode::BAD_GATEWAY, "ASSISTANT_ERROR", e.to_string()),
            AppError::WorkspaceNotFound(user) => (
                StatusCode::NOT_FOUND,
                "WORKSPACE_NOT_FOUND",
                format!("No open workspace for '{user}'"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        (status, Json(ApiResponse::failure(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Workspace(WorkspaceError::TaskNotFound(4)).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Workspace(WorkspaceError::InvalidSleepHours(30.0))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Assistant(LlmError::AuthenticationFailed)
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::WorkspaceNotFound("u1".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
