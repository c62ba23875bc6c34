//! Planner, insight and dashboard handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use studylife_types::task::StudyTask;
use studylife_types::wellness::DashboardSummary;

use super::find_workspace;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct Insight {
    pub insight: String,
}

/// POST /api/v1/workspaces/{user}/plan - Generate and append study tasks.
pub async fn generate_plan(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<PlanRequest>,
) -> Result<Json<ApiResponse<Vec<StudyTask>>>, AppError> {
    let start = Instant::now();
    if body.topic.trim().is_empty() {
        return Err(AppError::Validation("topic must not be empty".into()));
    }
    let workspace = find_workspace(&state, &user_id)?;
    let added = workspace.lock().await.generate_plan(&body.topic).await?;
    Ok(Json(ApiResponse::timed(added, start)))
}

/// POST /api/v1/workspaces/{user}/insight
pub async fn generate_insight(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Insight>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let insight = workspace.lock().await.generate_insight().await;
    Ok(Json(ApiResponse::timed(Insight { insight }, start)))
}

/// GET /api/v1/workspaces/{user}/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let summary = workspace.lock().await.dashboard();
    Ok(Json(ApiResponse::timed(summary, start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{identity, test_state};

    #[tokio::test]
    async fn plan_appends_tasks() {
        let (state, _dir) = test_state(
            r#"[{"title": "Read chapter 4", "priority": "High"}, {"title": "Practice set", "priority": "Medium"}]"#,
        )
        .await;
        state.workspace(identity("u1")).await;

        let Json(resp) = generate_plan(
            State(state.clone()),
            Path("u1".into()),
            Json(PlanRequest {
                topic: "Thermodynamics".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.data.unwrap().len(), 2);

        let Json(resp) = get_dashboard(State(state), Path("u1".into())).await.unwrap();
        assert!(resp.data.unwrap().total_tasks >= 2);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let (state, _dir) = test_state("[]").await;
        state.workspace(identity("u1")).await;
        let err = generate_plan(
            State(state),
            Path("u1".into()),
            Json(PlanRequest { topic: " ".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn insight_is_remembered_on_dashboard() {
        let (state, _dir) = test_state("Sleep a bit more tonight.").await;
        state.workspace(identity("u1")).await;

        let Json(resp) = generate_insight(State(state.clone()), Path("u1".into()))
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().insight, "Sleep a bit more tonight.");

        let Json(resp) = get_dashboard(State(state), Path("u1".into())).await.unwrap();
        assert_eq!(
            resp.data.unwrap().insight.as_deref(),
            Some("Sleep a bit more tonight.")
        );
    }
}
