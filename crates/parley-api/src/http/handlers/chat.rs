//! Chat CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/chats      - List chats, most recently updated first
//! - POST   /api/chats      - Create a chat
//! - GET    /api/chats/{id} - Get a chat with its messages
//! - PATCH  /api/chats/{id} - Rename a chat
//! - DELETE /api/chats/{id} - Delete a chat and its messages

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::state::{AppState, DEFAULT_USER_ID};

/// Request body for chat creation.
#[derive(Debug, Deserialize)]
pub struct ChatCreate {
    pub title: Option<String>,
}

/// Request body for chat rename.
#[derive(Debug, Deserialize)]
pub struct ChatUpdate {
    pub title: String,
}

/// GET /api/chats - List the user's chats.
pub async fn list_chats(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let chats = state
        .chat_service
        .list_chats(DEFAULT_USER_ID)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({ "chats": chats })))
}

/// POST /api/chats - Create a new chat.
pub async fn create_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatCreate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let chat = state
        .chat_service
        .create_chat(DEFAULT_USER_ID, body.title)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    serde_json::to_value(&chat)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// GET /api/chats/{id} - Get a chat together with its message history.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_uuid(&chat_id)?;

    let (chat, messages) = state
        .chat_service
        .get_chat_with_messages(DEFAULT_USER_ID, &id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

    let mut body =
        serde_json::to_value(&chat).map_err(|e| AppError::Internal(e.to_string()))?;
    body["messages"] =
        serde_json::to_value(&messages).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(body))
}

/// PATCH /api/chats/{id} - Rename a chat.
pub async fn update_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(body): Json<ChatUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_uuid(&chat_id)?;

    let chat = state
        .chat_service
        .rename_chat(DEFAULT_USER_ID, &id, &body.title)
        .await
        .map_err(|e| AppError::repository("Chat", e))?;

    serde_json::to_value(&chat)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// DELETE /api/chats/{id} - Delete a chat and all its messages.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_uuid(&chat_id)?;

    state
        .chat_service
        .delete_chat(DEFAULT_USER_ID, &id)
        .await
        .map_err(|e| AppError::repository("Chat", e))?;

    Ok(Json(serde_json::json!({ "success": true })))
}
