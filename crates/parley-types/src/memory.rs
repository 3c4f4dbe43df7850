//! User memory types.
//!
//! Memories are short free-text facts about a user. Enabled memories are
//! injected into the system prompt of every completion for that user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single remembered fact about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub user_id: String,
    pub content: String,
    /// Disabled memories are kept but excluded from prompt assembly.
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update to a memory. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub enabled: Option<bool>,
}
