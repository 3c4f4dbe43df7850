//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader pool for
//! SELECTs, writer pool for mutations.

use chrono::{DateTime, Utc};
use parley_core::repository::ChatRepository;
use parley_types::chat::{Chat, ChatMessage, MessageRole};
use parley_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    user_id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))?;
        Ok(Chat {
            id,
            user_id: self.user_id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    chat_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let chat_id = Uuid::parse_str(&self.chat_id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            chat_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chats (id, user_id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(&chat.user_id)
        .bind(&chat.title)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(chat.clone())
    }

    async fn get_chat(
        &self,
        user_id: &str,
        chat_id: &Uuid,
    ) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ? AND user_id = ?")
            .bind(chat_id.to_string())
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM chats WHERE user_id = ? ORDER BY updated_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row =
                ChatRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            chats.push(chat_row.into_chat()?);
        }

        Ok(chats)
    }

    async fn update_title(
        &self,
        user_id: &str,
        chat_id: &Uuid,
        title: &str,
    ) -> Result<Chat, RepositoryError> {
        let result =
            sqlx::query("UPDATE chats SET title = ?, updated_at = ? WHERE id = ? AND user_id = ?")
                .bind(title)
                .bind(format_datetime(&Utc::now()))
                .bind(chat_id.to_string())
                .bind(user_id)
                .execute(&self.pool.writer)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_chat(user_id, chat_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &Uuid) -> Result<(), RepositoryError> {
        // Messages and the chat row go together or not at all.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query("DELETE FROM chats WHERE id = ? AND user_id = ?")
            .bind(chat_id.to_string())
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        // The insert and the parent-chat bump land together or not at all.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Bump the parent chat so chat lists sort by last activity.
        sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&message.created_at))
            .bind(message.chat_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_messages(&self, chat_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
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

    fn make_chat(title: &str) -> Chat {
        let now = Utc::now();
        Chat {
            id: Uuid::now_v7(),
            user_id: USER.to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn make_message(chat_id: Uuid, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            chat_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_chat() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("New Chat");
        let created = repo.create_chat(&chat).await.unwrap();
        assert_eq!(created.id, chat.id);

        let found = repo.get_chat(USER, &chat.id).await.unwrap().unwrap();
        assert_eq!(found.id, chat.id);
        assert_eq!(found.title, "New Chat");
        assert_eq!(found.user_id, USER);
    }

    #[tokio::test]
    async fn test_get_chat_scoped_by_user() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("Private");
        repo.create_chat(&chat).await.unwrap();

        let found = repo.get_chat("someone-else", &chat.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_chats_ordered_by_activity() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let older = make_chat("Older");
        let newer = make_chat("Newer");
        repo.create_chat(&older).await.unwrap();
        repo.create_chat(&newer).await.unwrap();

        // Touch the older chat; it should move to the front.
        let msg = ChatMessage {
            created_at: Utc::now() + chrono::Duration::seconds(1),
            ..make_message(older.id, MessageRole::User, "bump")
        };
        repo.save_message(&msg).await.unwrap();

        let chats = repo.list_chats(USER).await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, older.id);
        assert_eq!(chats[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_update_title() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("New Chat");
        repo.create_chat(&chat).await.unwrap();

        let updated = repo
            .update_title(USER, &chat.id, "Rust questions")
            .await
            .unwrap();
        assert_eq!(updated.title, "Rust questions");
        assert!(updated.updated_at >= chat.updated_at);
    }

    #[tokio::test]
    async fn test_update_title_missing_chat() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let err = repo
            .update_title(USER, &Uuid::now_v7(), "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_chat_removes_messages() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("Doomed");
        repo.create_chat(&chat).await.unwrap();
        repo.save_message(&make_message(chat.id, MessageRole::User, "Hello"))
            .await
            .unwrap();
        repo.save_message(&make_message(chat.id, MessageRole::Assistant, "Hi"))
            .await
            .unwrap();

        repo.delete_chat(USER, &chat.id).await.unwrap();

        assert!(repo.get_chat(USER, &chat.id).await.unwrap().is_none());
        assert!(repo.get_messages(&chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_chat_missing() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let err = repo.delete_chat(USER, &Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_messages_ordered_ascending() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("Ordered");
        repo.create_chat(&chat).await.unwrap();

        let base = Utc::now();
        for (i, content) in ["first", "second", "third"].iter().enumerate() {
            let msg = ChatMessage {
                created_at: base + chrono::Duration::seconds(i as i64),
                ..make_message(chat.id, MessageRole::User, content)
            };
            repo.save_message(&msg).await.unwrap();
        }

        let messages = repo.get_messages(&chat.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_save_message_bumps_chat() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("Bumped");
        repo.create_chat(&chat).await.unwrap();

        let msg = ChatMessage {
            created_at: Utc::now() + chrono::Duration::seconds(5),
            ..make_message(chat.id, MessageRole::User, "Hello")
        };
        repo.save_message(&msg).await.unwrap();

        let found = repo.get_chat(USER, &chat.id).await.unwrap().unwrap();
        assert!(found.updated_at > chat.updated_at);
    }

    #[tokio::test]
    async fn test_rejected_message_leaves_chat_untouched() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("Stable");
        repo.create_chat(&chat).await.unwrap();

        // The role CHECK rejects the insert; the activity bump must roll
        // back with it.
        let msg = ChatMessage {
            created_at: Utc::now() + chrono::Duration::seconds(5),
            ..make_message(chat.id, MessageRole::System, "rejected")
        };
        repo.save_message(&msg).await.unwrap_err();

        let found = repo.get_chat(USER, &chat.id).await.unwrap().unwrap();
        assert_eq!(found.updated_at, chat.updated_at);
        assert!(repo.get_messages(&chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_role_constraint_rejects_system() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let chat = make_chat("Strict");
        repo.create_chat(&chat).await.unwrap();

        let msg = make_message(chat.id, MessageRole::System, "not persistable");
        let err = repo.save_message(&msg).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
