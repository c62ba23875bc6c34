//! Emergency mode handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use studylife_core::workspace::{EMERGENCY_NOTICE, StudentWorkspace};
use studylife_types::config::EmergencyContact;

use super::find_workspace;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SosView {
    pub active: bool,
    pub contacts: Vec<EmergencyContact>,
}

impl SosView {
    fn of(ws: &StudentWorkspace) -> Self {
        Self {
            active: ws.is_sos_active(),
            contacts: ws.emergency_contacts().to_vec(),
        }
    }
}

/// POST /api/v1/workspaces/{user}/sos
pub async fn activate_sos(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<SosView>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let mut ws = workspace.lock().await;
    if !ws.is_sos_active() {
        ws.activate_sos();
        ws.notices().error(EMERGENCY_NOTICE);
    }
    Ok(Json(ApiResponse::timed(SosView::of(&ws), start)))
}

/// DELETE /api/v1/workspaces/{user}/sos
pub async fn dismiss_sos(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<SosView>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let mut ws = workspace.lock().await;
    ws.dismiss_sos();
    Ok(Json(ApiResponse::timed(SosView::of(&ws), start)))
}
