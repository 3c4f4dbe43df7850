//! Chat service orchestrating chat lifecycle, message persistence,
//! user memories, and the streamed completion pipeline.
//!
//! `begin_completion` is the heart of the backend: it resolves the chat,
//! persists the user message, assembles context, and returns an event
//! stream that relays assistant output, persists it, and titles new chats.

use std::sync::Arc;

use chrono::Utc;
use futures_util::{Stream, StreamExt};
use parley_types::chat::{Chat, ChatMessage, MessageRole};
use parley_types::error::RepositoryError;
use parley_types::event::ChatEvent;
use parley_types::memory::{Memory, MemoryPatch};
use parley_types::model::ModelConfig;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{InferenceClient, LlmProvider};
use crate::model::ensure_builtins;
use crate::repository::{ChatRepository, MemoryRepository, ModelConfigRepository};

/// Title given to chats before one is generated.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Input to a completion: the user's message plus optional routing.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub content: String,
    pub chat_id: Option<Uuid>,
    pub selected_model_id: Option<String>,
}

/// Errors from the eager phase of a completion.
///
/// Once the event stream has started, nothing fails loudly anymore:
/// inference errors become inline text and persistence errors are logged.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Chat not found")]
    ChatNotFound,

    #[error("No model configuration available")]
    NoModelConfig,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Orchestrates chats, messages, memories, and completions.
///
/// Generic over the repository and provider traits to maintain clean
/// architecture (parley-core never depends on parley-infra).
pub struct ChatService<C, M, D, P>
where
    C: ChatRepository,
    M: MemoryRepository,
    D: ModelConfigRepository,
    P: LlmProvider,
{
    chat_repo: C,
    memory_repo: M,
    model_repo: D,
    inference: InferenceClient<P>,
}

impl<C, M, D, P> ChatService<C, M, D, P>
where
    C: ChatRepository + 'static,
    M: MemoryRepository + 'static,
    D: ModelConfigRepository + 'static,
    P: LlmProvider + 'static,
{
    pub fn new(chat_repo: C, memory_repo: M, model_repo: D, provider: Arc<P>) -> Self {
        Self {
            chat_repo,
            memory_repo,
            model_repo,
            inference: InferenceClient::new(provider),
        }
    }

    // --- Chat lifecycle ---

    /// Create a chat, defaulting the title to "New Chat".
    pub async fn create_chat(
        &self,
        user_id: &str,
        title: Option<String>,
    ) -> Result<Chat, RepositoryError> {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title: title.unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.chat_repo.create_chat(&chat).await
    }

    /// List a user's chats, most recently updated first.
    pub async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        self.chat_repo.list_chats(user_id).await
    }

    /// Get a chat together with its full ordered message history.
    pub async fn get_chat_with_messages(
        &self,
        user_id: &str,
        chat_id: &Uuid,
    ) -> Result<Option<(Chat, Vec<ChatMessage>)>, RepositoryError> {
        let Some(chat) = self.chat_repo.get_chat(user_id, chat_id).await? else {
            return Ok(None);
        };
        let messages = self.chat_repo.get_messages(chat_id).await?;
        Ok(Some((chat, messages)))
    }

    /// Rename a chat. `RepositoryError::NotFound` when absent.
    pub async fn rename_chat(
        &self,
        user_id: &str,
        chat_id: &Uuid,
        title: &str,
    ) -> Result<Chat, RepositoryError> {
        self.chat_repo.update_title(user_id, chat_id, title).await
    }

    /// Delete a chat and all its messages.
    pub async fn delete_chat(
        &self,
        user_id: &str,
        chat_id: &Uuid,
    ) -> Result<(), RepositoryError> {
        self.chat_repo.delete_chat(user_id, chat_id).await
    }

    // --- Memory operations ---

    pub async fn create_memory(
        &self,
        user_id: &str,
        content: String,
    ) -> Result<Memory, RepositoryError> {
        let memory = Memory {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            content,
            enabled: true,
            created_at: Utc::now(),
        };
        self.memory_repo.create(&memory).await
    }

    /// List all memories, disabled ones included.
    pub async fn list_memories(&self, user_id: &str) -> Result<Vec<Memory>, RepositoryError> {
        self.memory_repo.list(user_id, false).await
    }

    pub async fn update_memory(
        &self,
        user_id: &str,
        memory_id: &Uuid,
        patch: &MemoryPatch,
    ) -> Result<Memory, RepositoryError> {
        self.memory_repo.update(user_id, memory_id, patch).await
    }

    pub async fn delete_memory(
        &self,
        user_id: &str,
        memory_id: &Uuid,
    ) -> Result<(), RepositoryError> {
        self.memory_repo.delete(user_id, memory_id).await
    }

    // --- Completion pipeline ---

    /// Start a chat completion.
    ///
    /// Runs the eager phase (chat resolution, user-message persistence,
    /// model resolution, context assembly) and returns the event stream
    /// for the rest. Eager errors map to HTTP status codes; the stream
    /// itself never errors.
    ///
    /// Event order: `Control`, zero or more `Content` fragments, `Title`
    /// for newly created chats, then `Done`.
    pub async fn begin_completion(
        self: &Arc<Self>,
        user_id: &str,
        params: CompletionParams,
    ) -> Result<impl Stream<Item = ChatEvent> + Send + 'static + use<C, M, D, P>, CompletionError>
    {
        let (chat, is_new) = match params.chat_id {
            Some(chat_id) => {
                let chat = self
                    .chat_repo
                    .get_chat(user_id, &chat_id)
                    .await?
                    .ok_or(CompletionError::ChatNotFound)?;
                (chat, false)
            }
            None => (self.create_chat(user_id, None).await?, true),
        };

        self.append_message(chat.id, MessageRole::User, params.content.clone())
            .await?;

        let config = self
            .resolve_model_config(params.selected_model_id.as_deref())
            .await?;

        // Fresh read so the history includes the message just saved.
        let history = self.chat_repo.get_messages(&chat.id).await?;
        let memories = self.memory_repo.list(user_id, true).await?;

        info!(
            chat_id = %chat.id,
            is_new,
            model = %config.model_id,
            history_len = history.len(),
            "starting completion"
        );

        let fragments = self.inference.complete_streaming(
            &history,
            &memories,
            &config.model_id,
            config.max_tokens,
            config.temperature,
        );

        let service = Arc::clone(self);
        let user_id = user_id.to_string();
        let chat_id = chat.id;
        let seed = params.content;
        let model_id = config.model_id;

        Ok(async_stream::stream! {
            yield ChatEvent::Control { chat_id, is_new };

            futures_util::pin_mut!(fragments);
            let mut full_response = String::new();
            while let Some(fragment) = fragments.next().await {
                full_response.push_str(&fragment);
                yield ChatEvent::Content { content: fragment };
            }

            // Persistence past this point is best-effort: the client may
            // already be gone and the stream must still terminate cleanly.
            if let Err(e) = service
                .append_message(chat_id, MessageRole::Assistant, full_response)
                .await
            {
                warn!(chat_id = %chat_id, error = %e, "failed to persist assistant message");
            }

            if is_new {
                let title = service.inference.generate_title(&seed, &model_id).await;
                if let Err(e) = service
                    .chat_repo
                    .update_title(&user_id, &chat_id, &title)
                    .await
                {
                    warn!(chat_id = %chat_id, error = %e, "failed to persist generated title");
                }
                yield ChatEvent::Title { title };
            }

            yield ChatEvent::Done;
        })
    }

    /// Resolve the config for a completion: the selected one when it
    /// exists, else the default, else bootstrap the built-ins and retry.
    async fn resolve_model_config(
        &self,
        selected: Option<&str>,
    ) -> Result<ModelConfig, CompletionError> {
        if let Some(config_id) = selected {
            if let Some(config) = self.model_repo.get(config_id).await? {
                return Ok(config);
            }
        }
        if let Some(config) = self.model_repo.get_default().await? {
            return Ok(config);
        }
        ensure_builtins(&self.model_repo).await?;
        self.model_repo
            .get_default()
            .await?
            .ok_or(CompletionError::NoModelConfig)
    }

    async fn append_message(
        &self,
        chat_id: Uuid,
        role: MessageRole,
        content: String,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            chat_id,
            role,
            content,
            created_at: Utc::now(),
        };
        self.chat_repo.save_message(&message).await?;
        Ok(message)
    }
}
