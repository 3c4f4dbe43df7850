//! SQLite memory repository implementation.

use chrono::{DateTime, Utc};
use parley_core::repository::MemoryRepository;
use parley_types::error::RepositoryError;
use parley_types::memory::{Memory, MemoryPatch};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MemoryRepository`.
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MemoryRow {
    id: String,
    user_id: String,
    content: String,
    enabled: i64,
    created_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            enabled: row.try_get("enabled")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_memory(self) -> Result<Memory, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid memory id: {e}")))?;
        Ok(Memory {
            id,
            user_id: self.user_id,
            content: self.content,
            enabled: self.enabled != 0,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl MemoryRepository for SqliteMemoryRepository {
    async fn create(&self, memory: &Memory) -> Result<Memory, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO memories (id, user_id, content, enabled, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(memory.id.to_string())
        .bind(&memory.user_id)
        .bind(&memory.content)
        .bind(memory.enabled as i64)
        .bind(memory.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(memory.clone())
    }

    async fn get(
        &self,
        user_id: &str,
        memory_id: &Uuid,
    ) -> Result<Option<Memory>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM memories WHERE id = ? AND user_id = ?")
            .bind(memory_id.to_string())
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let memory_row = MemoryRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(memory_row.into_memory()?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        user_id: &str,
        enabled_only: bool,
    ) -> Result<Vec<Memory>, RepositoryError> {
        let sql = if enabled_only {
            "SELECT * FROM memories WHERE user_id = ? AND enabled = 1 ORDER BY created_at ASC"
        } else {
            "SELECT * FROM memories WHERE user_id = ? ORDER BY created_at ASC"
        };

        let rows = sqlx::query(sql)
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut memories = Vec::with_capacity(rows.len());
        for row in &rows {
            let memory_row =
                MemoryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            memories.push(memory_row.into_memory()?);
        }

        Ok(memories)
    }

    async fn update(
        &self,
        user_id: &str,
        memory_id: &Uuid,
        patch: &MemoryPatch,
    ) -> Result<Memory, RepositoryError> {
        if patch.content.is_some() || patch.enabled.is_some() {
            let mut sets = Vec::new();
            if patch.content.is_some() {
                sets.push("content = ?");
            }
            if patch.enabled.is_some() {
                sets.push("enabled = ?");
            }
            let sql = format!(
                "UPDATE memories SET {} WHERE id = ? AND user_id = ?",
                sets.join(", ")
            );

            let mut query = sqlx::query(&sql);
            if let Some(content) = &patch.content {
                query = query.bind(content);
            }
            if let Some(enabled) = patch.enabled {
                query = query.bind(enabled as i64);
            }
            let result = query
                .bind(memory_id.to_string())
                .bind(user_id)
                .execute(&self.pool.writer)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        self.get(user_id, memory_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, user_id: &str, memory_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ? AND user_id = ?")
            .bind(memory_id.to_string())
            .bind(user_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    const USER: &str = "default-user";

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_memory(content: &str) -> Memory {
        Memory {
            id: Uuid::now_v7(),
            user_id: USER.to_string(),
            content: content.to_string(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_memory() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let memory = make_memory("Prefers dark mode");
        repo.create(&memory).await.unwrap();

        let found = repo.get(USER, &memory.id).await.unwrap().unwrap();
        assert_eq!(found.content, "Prefers dark mode");
        assert!(found.enabled);
    }

    #[tokio::test]
    async fn test_list_enabled_only() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let on = make_memory("enabled one");
        let off = Memory {
            enabled: false,
            ..make_memory("disabled one")
        };
        repo.create(&on).await.unwrap();
        repo.create(&off).await.unwrap();

        let all = repo.list(USER, false).await.unwrap();
        assert_eq!(all.len(), 2);

        let enabled = repo.list(USER, true).await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, on.id);
    }

    #[tokio::test]
    async fn test_patch_content_only() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let memory = make_memory("old content");
        repo.create(&memory).await.unwrap();

        let patch = MemoryPatch {
            content: Some("new content".to_string()),
            enabled: None,
        };
        let updated = repo.update(USER, &memory.id, &patch).await.unwrap();
        assert_eq!(updated.content, "new content");
        assert!(updated.enabled);
    }

    #[tokio::test]
    async fn test_patch_enabled_only() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let memory = make_memory("keep this text");
        repo.create(&memory).await.unwrap();

        let patch = MemoryPatch {
            content: None,
            enabled: Some(false),
        };
        let updated = repo.update(USER, &memory.id, &patch).await.unwrap();
        assert_eq!(updated.content, "keep this text");
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn test_empty_patch_returns_current_row() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let memory = make_memory("unchanged");
        repo.create(&memory).await.unwrap();

        let updated = repo
            .update(USER, &memory.id, &MemoryPatch::default())
            .await
            .unwrap();
        assert_eq!(updated.content, "unchanged");
        assert!(updated.enabled);
    }

    #[tokio::test]
    async fn test_update_missing_memory() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let patch = MemoryPatch {
            content: Some("anything".to_string()),
            enabled: None,
        };
        let err = repo.update(USER, &Uuid::now_v7(), &patch).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_memory() {
        let repo = SqliteMemoryRepository::new(test_pool().await);

        let memory = make_memory("temporary");
        repo.create(&memory).await.unwrap();

        repo.delete(USER, &memory.id).await.unwrap();
        assert!(repo.get(USER, &memory.id).await.unwrap().is_none());

        let err = repo.delete(USER, &memory.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
