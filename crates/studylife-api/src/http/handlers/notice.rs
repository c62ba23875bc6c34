//! GET /api/v1/workspaces/{user}/notices - The user's unexpired notices.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use studylife_types::notice::Notice;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn list_notices(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Notice>>>, AppError> {
    let start = Instant::now();
    let notices = state
        .workspace_notices(&user_id)
        .ok_or_else(|| AppError::WorkspaceNotFound(user_id.clone()))?;
    Ok(Json(ApiResponse::timed(notices.active(chrono::Utc::now()), start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{identity, test_state};
    use studylife_core::workspace::EMERGENCY_NOTICE;

    #[tokio::test]
    async fn lists_only_the_users_notices() {
        let (state, _dir) = test_state("ok").await;
        let alice = state.workspace(identity("alice")).await;
        state.workspace(identity("bob")).await;
        alice.lock().await.send_message("this is an emergency", None).await;

        let Json(resp) = list_notices(State(state.clone()), Path("alice".into()))
            .await
            .unwrap();
        let messages: Vec<String> = resp.data.unwrap().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec![EMERGENCY_NOTICE.to_string()]);

        let Json(resp) = list_notices(State(state), Path("bob".into())).await.unwrap();
        assert!(resp.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_workspace_is_not_found() {
        let (state, _dir) = test_state("ok").await;
        let err = list_notices(State(state), Path("ghost".into())).await.err().unwrap();
        assert!(matches!(err, AppError::WorkspaceNotFound(u) if u == "ghost"));
    }
}
