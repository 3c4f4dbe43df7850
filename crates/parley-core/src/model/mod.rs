//! Model configuration management.

pub mod service;

pub use service::ModelService;

use chrono::Utc;
use parley_types::error::RepositoryError;
use parley_types::model::ModelConfig;

use crate::repository::ModelConfigRepository;

/// The built-in configs materialized when the store is empty.
pub fn builtin_configs() -> Vec<ModelConfig> {
    let now = Utc::now();
    vec![
        ModelConfig {
            id: "claude-opus-4".to_string(),
            name: "Claude Opus 4".to_string(),
            model_id: "us.anthropic.claude-opus-4-20250514-v1:0".to_string(),
            max_tokens: 16000,
            temperature: 0.7,
            is_default: true,
            updated_at: now,
        },
        ModelConfig {
            id: "claude-sonnet-4".to_string(),
            name: "Claude Sonnet 4".to_string(),
            model_id: "us.anthropic.claude-sonnet-4-20250514-v1:0".to_string(),
            max_tokens: 8000,
            temperature: 0.7,
            is_default: false,
            updated_at: now,
        },
    ]
}

/// Seed the built-in configs when no config exists yet. Idempotent.
pub async fn ensure_builtins<D: ModelConfigRepository>(repo: &D) -> Result<(), RepositoryError> {
    if repo.list().await?.is_empty() {
        for config in builtin_configs() {
            repo.upsert(&config).await?;
        }
    }
    Ok(())
}
