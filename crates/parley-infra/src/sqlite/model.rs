//! SQLite model config repository implementation.
//!
//! Upserts run inside a transaction so the single-default invariant
//! holds even when the new config claims the default flag.

use chrono::{DateTime, Utc};
use parley_core::repository::ModelConfigRepository;
use parley_types::error::RepositoryError;
use parley_types::model::ModelConfig;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ModelConfigRepository`.
pub struct SqliteModelConfigRepository {
    pool: DatabasePool,
}

impl SqliteModelConfigRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ModelConfigRow {
    id: String,
    name: String,
    model_id: String,
    max_tokens: i64,
    temperature: f64,
    is_default: i64,
    updated_at: String,
}

impl ModelConfigRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            model_id: row.try_get("model_id")?,
            max_tokens: row.try_get("max_tokens")?,
            temperature: row.try_get("temperature")?,
            is_default: row.try_get("is_default")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_config(self) -> Result<ModelConfig, RepositoryError> {
        let max_tokens = u32::try_from(self.max_tokens).map_err(|_| {
            RepositoryError::Query(format!("max_tokens out of range: {}", self.max_tokens))
        })?;
        Ok(ModelConfig {
            id: self.id,
            name: self.name,
            model_id: self.model_id,
            max_tokens,
            temperature: self.temperature,
            is_default: self.is_default != 0,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl ModelConfigRepository for SqliteModelConfigRepository {
    async fn upsert(&self, config: &ModelConfig) -> Result<ModelConfig, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if config.is_default {
            sqlx::query("UPDATE model_configs SET is_default = 0 WHERE id != ?")
                .bind(&config.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        sqlx::query(
            r#"INSERT INTO model_configs (id, name, model_id, max_tokens, temperature, is_default, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   model_id = excluded.model_id,
                   max_tokens = excluded.max_tokens,
                   temperature = excluded.temperature,
                   is_default = excluded.is_default,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&config.id)
        .bind(&config.name)
        .bind(&config.model_id)
        .bind(config.max_tokens as i64)
        .bind(config.temperature)
        .bind(config.is_default as i64)
        .bind(config.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(config.clone())
    }

    async fn get(&self, config_id: &str) -> Result<Option<ModelConfig>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM model_configs WHERE id = ?")
            .bind(config_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let config_row = ModelConfigRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(config_row.into_config()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<ModelConfig>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM model_configs ORDER BY id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut configs = Vec::with_capacity(rows.len());
        for row in &rows {
            let config_row =
                ModelConfigRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            configs.push(config_row.into_config()?);
        }

        Ok(configs)
    }

    async fn delete(&self, config_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM model_configs WHERE id = ?")
            .bind(config_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_default(&self) -> Result<Option<ModelConfig>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM model_configs ORDER BY is_default DESC, id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let config_row = ModelConfigRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(config_row.into_config()?))
            }
            None => Ok(None),
        }
    }
}
