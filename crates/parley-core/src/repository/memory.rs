//! MemoryRepository trait definition.

use parley_types::error::RepositoryError;
use parley_types::memory::{Memory, MemoryPatch};
use uuid::Uuid;

/// Repository trait for user memory persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteMemoryRepository`).
pub trait MemoryRepository: Send + Sync {
    /// Persist a new memory.
    fn create(
        &self,
        memory: &Memory,
    ) -> impl std::future::Future<Output = Result<Memory, RepositoryError>> + Send;

    /// Get a memory by ID, scoped to its owner.
    fn get(
        &self,
        user_id: &str,
        memory_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Memory>, RepositoryError>> + Send;

    /// List a user's memories, ordered by created_at ASC.
    ///
    /// With `enabled_only`, disabled memories are excluded.
    fn list(
        &self,
        user_id: &str,
        enabled_only: bool,
    ) -> impl std::future::Future<Output = Result<Vec<Memory>, RepositoryError>> + Send;

    /// Apply a partial update; `None` fields are left unchanged.
    ///
    /// A patch with no fields set returns the current row untouched.
    /// Returns `RepositoryError::NotFound` when the memory does not exist.
    fn update(
        &self,
        user_id: &str,
        memory_id: &Uuid,
        patch: &MemoryPatch,
    ) -> impl std::future::Future<Output = Result<Memory, RepositoryError>> + Send;

    /// Delete a memory. `RepositoryError::NotFound` when absent.
    fn delete(
        &self,
        user_id: &str,
        memory_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
