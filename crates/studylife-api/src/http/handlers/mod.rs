//! HTTP request handlers for the REST API.
//!
//! Every `/workspaces/{user}/...` route needs the workspace to have been
//! opened with `POST /workspaces` first.

pub mod assistant;
pub mod chat;
pub mod notice;
pub mod profile;
pub mod sos;
pub mod task;
pub mod workspace;

use crate::http::error::AppError;
use crate::state::{AppState, SharedWorkspace};

pub(crate) fn find_workspace(state: &AppState, user_id: &str) -> Result<SharedWorkspace, AppError> {
    state
        .existing_workspace(user_id)
        .ok_or_else(|| AppError::WorkspaceNotFound(user_id.to_string()))
}
