//! Workspace lifecycle handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use studylife_types::identity::AuthIdentity;
use studylife_types::wellness::DashboardSummary;

use super::profile::ProfileView;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub user_id: String,
    pub profile: ProfileView,
    pub dashboard: DashboardSummary,
}

/// POST /api/v1/workspaces - Open (or return) the workspace for an identity.
pub async fn open_workspace(
    State(state): State<AppState>,
    Json(identity): Json<AuthIdentity>,
) -> Result<Json<ApiResponse<WorkspaceView>>, AppError> {
    let start = Instant::now();
    if identity.id.trim().is_empty() {
        return Err(AppError::Validation("identity id must not be empty".into()));
    }

    let workspace = state.workspace(identity).await;
    let ws = workspace.lock().await;
    let view = WorkspaceView {
        user_id: ws.user_id().to_string(),
        profile: ProfileView::of(&ws),
        dashboard: ws.dashboard(),
    };

    Ok(Json(ApiResponse::timed(view, start)))
}

#[derive(Debug, Serialize)]
pub struct Closed {
    pub closed: bool,
}

/// DELETE /api/v1/workspaces/{user} - Save pending edits and close.
pub async fn close_workspace(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Closed>>, AppError> {
    let start = Instant::now();
    if !state.close_workspace(&user_id).await {
        return Err(AppError::WorkspaceNotFound(user_id));
    }
    Ok(Json(ApiResponse::timed(Closed { closed: true }, start)))
}
