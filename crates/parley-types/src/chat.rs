//! Chat and message types for Parley.
//!
//! A chat is an ordered conversation between one user and the assistant.
//! Messages are persisted individually and replayed as LLM context on
//! every completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// A chat conversation owned by a single user.
///
/// `updated_at` is bumped whenever a message is appended or the title is
/// renamed, so chat lists sort by recent activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message within a chat.
///
/// Only `user` and `assistant` roles are persisted; system prompts are
/// assembled per-request and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
