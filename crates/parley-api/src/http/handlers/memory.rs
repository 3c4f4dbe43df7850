//! Memory CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/memories      - List all memories, disabled ones included
//! - POST   /api/memories      - Create a memory (enabled by default)
//! - PATCH  /api/memories/{id} - Update content and/or enabled flag
//! - DELETE /api/memories/{id} - Delete a memory

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use parley_types::memory::MemoryPatch;

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::state::{AppState, DEFAULT_USER_ID};

/// Request body for memory creation.
#[derive(Debug, Deserialize)]
pub struct MemoryCreate {
    pub content: String,
}

/// GET /api/memories - List the user's memories.
pub async fn list_memories(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let memories = state
        .chat_service
        .list_memories(DEFAULT_USER_ID)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({ "memories": memories })))
}

/// POST /api/memories - Create a new memory.
pub async fn create_memory(
    State(state): State<AppState>,
    Json(body): Json<MemoryCreate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let memory = state
        .chat_service
        .create_memory(DEFAULT_USER_ID, body.content)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    serde_json::to_value(&memory)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// PATCH /api/memories/{id} - Update a memory.
pub async fn update_memory(
    State(state): State<AppState>,
    Path(memory_id): Path<String>,
    Json(patch): Json<MemoryPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_uuid(&memory_id)?;

    let memory = state
        .chat_service
        .update_memory(DEFAULT_USER_ID, &id, &patch)
        .await
        .map_err(|e| AppError::repository("Memory", e))?;

    serde_json::to_value(&memory)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// DELETE /api/memories/{id} - Delete a memory.
pub async fn delete_memory(
    State(state): State<AppState>,
    Path(memory_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_uuid(&memory_id)?;

    state
        .chat_service
        .delete_memory(DEFAULT_USER_ID, &id)
        .await
        .map_err(|e| AppError::repository("Memory", e))?;

    Ok(Json(serde_json::json!({ "success": true })))
}
