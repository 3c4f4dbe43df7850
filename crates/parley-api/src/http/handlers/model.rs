//! Model configuration HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/models                  - List configs (seeds built-ins when empty)
//! - POST   /api/models                  - Create or replace a config
//! - GET    /api/models/{id}             - Get a single config
//! - DELETE /api/models/{id}             - Delete a config
//! - POST   /api/models/{id}/set-default - Mark a config as the default

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use parley_types::model::{ModelConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for model config creation. `config_id` is the caller-chosen
/// primary key; posting an existing id replaces that config.
#[derive(Debug, Deserialize)]
pub struct ModelConfigCreate {
    pub config_id: String,
    pub name: String,
    pub model_id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub is_default: bool,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

/// GET /api/models - List all model configs.
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let models = state
        .model_service
        .list()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({ "models": models })))
}

/// POST /api/models - Create or replace a model config.
pub async fn create_model(
    State(state): State<AppState>,
    Json(body): Json<ModelConfigCreate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let config = ModelConfig {
        id: body.config_id,
        name: body.name,
        model_id: body.model_id,
        max_tokens: body.max_tokens,
        temperature: body.temperature,
        is_default: body.is_default,
        updated_at: Utc::now(),
    };

    let config = state
        .model_service
        .upsert(config)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    serde_json::to_value(&config)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// GET /api/models/{id} - Get a model config by id.
pub async fn get_model(
    State(state): State<AppState>,
    Path(config_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let config = state
        .model_service
        .get(&config_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Model config not found".to_string()))?;

    serde_json::to_value(&config)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// DELETE /api/models/{id} - Delete a model config.
pub async fn delete_model(
    State(state): State<AppState>,
    Path(config_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .model_service
        .delete(&config_id)
        .await
        .map_err(|e| AppError::repository("Model config", e))?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/models/{id}/set-default - Make a config the default.
pub async fn set_default_model(
    State(state): State<AppState>,
    Path(config_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let config = state
        .model_service
        .set_default(&config_id)
        .await
        .map_err(|e| AppError::repository("Model config", e))?;

    serde_json::to_value(&config)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}
