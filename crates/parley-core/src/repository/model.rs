//! ModelConfigRepository trait definition.

use parley_types::error::RepositoryError;
use parley_types::model::ModelConfig;

/// Repository trait for model configuration persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteModelConfigRepository`).
/// Configs are keyed by caller-chosen string ids, so create and replace are
/// a single upsert.
pub trait ModelConfigRepository: Send + Sync {
    /// Insert or replace a config.
    ///
    /// When `config.is_default` is set, all other configs lose their default
    /// flag in the same transaction. At most one default at any time.
    fn upsert(
        &self,
        config: &ModelConfig,
    ) -> impl std::future::Future<Output = Result<ModelConfig, RepositoryError>> + Send;

    /// Get a config by ID.
    fn get(
        &self,
        config_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ModelConfig>, RepositoryError>> + Send;

    /// List all configs, ordered by ID.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ModelConfig>, RepositoryError>> + Send;

    /// Delete a config. `RepositoryError::NotFound` when absent.
    fn delete(
        &self,
        config_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the default config: the default-flagged one, else the first
    /// config by ID, else `None`.
    fn get_default(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<ModelConfig>, RepositoryError>> + Send;
}
