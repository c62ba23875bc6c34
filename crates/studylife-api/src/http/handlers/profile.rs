//! Profile handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use studylife_core::workspace::StudentWorkspace;
use studylife_types::profile::ProfileField;

use super::find_workspace;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Profile fields plus autosave status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub sleep_hours: f64,
    pub task_count: usize,
    pub message_count: usize,
    /// Fields edited but not yet saved.
    pub pending_fields: Vec<ProfileField>,
    pub saves_issued: u64,
}

impl ProfileView {
    pub fn of(ws: &StudentWorkspace) -> Self {
        let profile = ws.profile();
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            sleep_hours: profile.sleep_hours,
            task_count: profile.tasks.len(),
            message_count: profile.chat_history.len(),
            pending_fields: ws.pending_fields(),
            saves_issued: ws.saves_issued(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub sleep_hours: Option<f64>,
    /// Save immediately instead of waiting for the quiet window.
    #[serde(default)]
    pub save: bool,
}

/// GET /api/v1/workspaces/{user}/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileView>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let ws = workspace.lock().await;
    Ok(Json(ApiResponse::timed(ProfileView::of(&ws), start)))
}

/// PATCH /api/v1/workspaces/{user}/profile
///
/// Sleep hours are validated before anything is applied.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateProfile>,
) -> Result<Json<ApiResponse<ProfileView>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let mut ws = workspace.lock().await;

    if let Some(hours) = body.sleep_hours {
        ws.set_sleep_hours(hours)?;
    }
    if let Some(name) = body.name {
        ws.set_name(name);
    }
    if let Some(email) = body.email {
        ws.set_email(email);
    }
    if body.save {
        ws.save_profile().await;
    }

    Ok(Json(ApiResponse::timed(ProfileView::of(&ws), start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{identity, test_state};
    use studylife_core::storage::profile_store::ProfileStore;
    use studylife_types::error::WorkspaceError;

    #[tokio::test]
    async fn patch_then_save_persists() {
        let (state, _dir) = test_state("ok").await;
        state.workspace(identity("u1")).await;

        let Json(resp) = update_profile(
            State(state.clone()),
            Path("u1".into()),
            Json(UpdateProfile {
                sleep_hours: Some(7.5),
                save: true,
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let view = resp.data.unwrap();
        assert_eq!(view.sleep_hours, 7.5);
        assert!(view.pending_fields.is_empty());

        let saved = state.store.load("u1").await.unwrap().unwrap();
        assert_eq!(saved.sleep_hours, Some(7.5));
    }

    #[tokio::test]
    async fn invalid_sleep_hours_rejected() {
        let (state, _dir) = test_state("ok").await;
        state.workspace(identity("u1")).await;

        let err = update_profile(
            State(state),
            Path("u1".into()),
            Json(UpdateProfile {
                sleep_hours: Some(-1.0),
                name: Some("Grace".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Workspace(WorkspaceError::InvalidSleepHours(_))
        ));
    }

    #[tokio::test]
    async fn unknown_workspace_is_not_found() {
        let (state, _dir) = test_state("ok").await;
        let err = get_profile(State(state), Path("nobody".into())).await.unwrap_err();
        assert!(matches!(err, AppError::WorkspaceNotFound(_)));
    }
}
