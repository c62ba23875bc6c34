//! Task list handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use studylife_types::error::WorkspaceError;
use studylife_types::task::{StudyTask, TaskPriority};

use super::find_workspace;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub priority: TaskPriority,
}

#[derive(Debug, Deserialize)]
pub struct RenameTask {
    pub title: String,
}

/// GET /api/v1/workspaces/{user}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<StudyTask>>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let tasks = workspace.lock().await.tasks().to_vec();
    Ok(Json(ApiResponse::timed(tasks, start)))
}

/// POST /api/v1/workspaces/{user}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateTask>,
) -> Result<Json<ApiResponse<StudyTask>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let task = workspace.lock().await.add_task(&body.title, body.priority)?;
    Ok(Json(ApiResponse::timed(task, start)))
}

/// POST /api/v1/workspaces/{user}/tasks/{id}/toggle
pub async fn toggle_task(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, u64)>,
) -> Result<Json<ApiResponse<StudyTask>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let mut ws = workspace.lock().await;
    ws.toggle_task(id)?;
    let task = task_by_id(ws.tasks(), id)?;
    Ok(Json(ApiResponse::timed(task, start)))
}

/// PATCH /api/v1/workspaces/{user}/tasks/{id}
pub async fn rename_task(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, u64)>,
    Json(body): Json<RenameTask>,
) -> Result<Json<ApiResponse<StudyTask>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let mut ws = workspace.lock().await;
    ws.rename_task(id, &body.title)?;
    let task = task_by_id(ws.tasks(), id)?;
    Ok(Json(ApiResponse::timed(task, start)))
}

/// DELETE /api/v1/workspaces/{user}/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, u64)>,
) -> Result<Json<ApiResponse<StudyTask>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let removed = workspace.lock().await.remove_task(id)?;
    Ok(Json(ApiResponse::timed(removed, start)))
}

fn task_by_id(tasks: &[StudyTask], id: u64) -> Result<StudyTask, AppError> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or(AppError::Workspace(WorkspaceError::TaskNotFound(id)))
}
