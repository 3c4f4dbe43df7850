//! ChatRepository trait definition.
//!
//! Provides CRUD operations for chats and their messages. All chat lookups
//! are scoped by user so one user can never address another's rows.

use parley_types::chat::{Chat, ChatMessage};
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat and message persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
pub trait ChatRepository: Send + Sync {
    /// Persist a new chat.
    fn create_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat by ID, scoped to its owner.
    fn get_chat(
        &self,
        user_id: &str,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// List a user's chats, ordered by updated_at DESC.
    fn list_chats(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Rename a chat and bump its updated_at.
    ///
    /// Returns `RepositoryError::NotFound` when the chat does not exist
    /// for this user.
    fn update_title(
        &self,
        user_id: &str,
        chat_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Delete a chat and all of its messages in one transaction.
    fn delete_chat(
        &self,
        user_id: &str,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Save a new message and bump the parent chat's updated_at.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get all messages for a chat, ordered by created_at ASC.
    fn get_messages(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
