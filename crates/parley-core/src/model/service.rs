//! Model configuration service.

use chrono::Utc;
use parley_types::error::RepositoryError;
use parley_types::model::ModelConfig;

use crate::model::ensure_builtins;
use crate::repository::ModelConfigRepository;

/// CRUD over model configurations, with lazy built-in bootstrapping.
pub struct ModelService<D: ModelConfigRepository> {
    model_repo: D,
}

impl<D: ModelConfigRepository> ModelService<D> {
    pub fn new(model_repo: D) -> Self {
        Self { model_repo }
    }

    /// List all configs, seeding the built-ins first when none exist.
    pub async fn list(&self) -> Result<Vec<ModelConfig>, RepositoryError> {
        ensure_builtins(&self.model_repo).await?;
        self.model_repo.list().await
    }

    pub async fn get(&self, config_id: &str) -> Result<Option<ModelConfig>, RepositoryError> {
        self.model_repo.get(config_id).await
    }

    /// Create or replace a config with a fresh updated_at.
    pub async fn upsert(&self, mut config: ModelConfig) -> Result<ModelConfig, RepositoryError> {
        config.updated_at = Utc::now();
        self.model_repo.upsert(&config).await
    }

    pub async fn delete(&self, config_id: &str) -> Result<(), RepositoryError> {
        self.model_repo.delete(config_id).await
    }

    /// Flag an existing config as the default.
    ///
    /// `RepositoryError::NotFound` when the config does not exist. The
    /// previous default loses its flag in the repository's transaction.
    pub async fn set_default(&self, config_id: &str) -> Result<ModelConfig, RepositoryError> {
        let mut config = self
            .model_repo
            .get(config_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        config.is_default = true;
        config.updated_at = Utc::now();
        self.model_repo.upsert(&config).await
    }
}
