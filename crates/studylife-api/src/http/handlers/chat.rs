//! Chat handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use studylife_types::chat::{Attachment, ChatMessage};

use super::find_workspace;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// `None` when there was nothing to send.
    pub reply: Option<ChatMessage>,
    pub sos_active: bool,
}

/// GET /api/v1/workspaces/{user}/chat
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let history = workspace.lock().await.chat_history().to_vec();
    Ok(Json(ApiResponse::timed(history, start)))
}

/// POST /api/v1/workspaces/{user}/chat
///
/// Assistant failures still return 200 with the inline error reply.
pub async fn send_message(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<SendMessage>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let start = Instant::now();
    let workspace = find_workspace(&state, &user_id)?;
    let mut ws = workspace.lock().await;

    let reply = ws.send_message(&body.text, body.attachment).await;
    let sos_active = ws.is_sos_active();

    Ok(Json(ApiResponse::timed(ChatReply { reply, sos_active }, start)))
}
