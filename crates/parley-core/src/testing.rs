//! In-memory fakes for service and client tests.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

use chrono::Utc;
use futures_util::Stream;
use parley_types::chat::{Chat, ChatMessage};
use parley_types::error::RepositoryError;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent,
};
use parley_types::memory::{Memory, MemoryPatch};
use parley_types::model::ModelConfig;
use uuid::Uuid;

use crate::llm::provider::LlmProvider;
use crate::repository::{ChatRepository, MemoryRepository, ModelConfigRepository};

/// LLM provider that replays scripted events and completions.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    stream_events: Mutex<Option<Vec<Result<StreamEvent, LlmError>>>>,
    completions: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_stream(self, events: Vec<Result<StreamEvent, LlmError>>) -> Self {
        *self.stream_events.lock().unwrap() = Some(events);
        self
    }

    pub(crate) fn with_completion(self, result: Result<String, LlmError>) -> Self {
        self.completions.lock().unwrap().push_back(result);
        self
    }

    /// All requests seen so far, streaming and one-shot alike.
    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.completions.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(CompletionResponse {
                id: "scripted".to_string(),
                content,
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
            }),
            Some(Err(e)) => Err(e),
            None => Err(LlmError::Provider {
                message: "no scripted completion".to_string(),
            }),
        }
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        self.requests.lock().unwrap().push(request);
        let events = self
            .stream_events
            .lock()
            .unwrap()
            .take()
            .unwrap_or_default();
        Box::pin(futures_util::stream::iter(events))
    }
}

/// Vec-backed chat repository.
#[derive(Default)]
pub(crate) struct InMemoryChatRepository {
    chats: Mutex<Vec<Chat>>,
    messages: Mutex<Vec<ChatMessage>>,
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        self.chats.lock().unwrap().push(chat.clone());
        Ok(chat.clone())
    }

    async fn get_chat(
        &self,
        user_id: &str,
        chat_id: &Uuid,
    ) -> Result<Option<Chat>, RepositoryError> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id && c.id == *chat_id)
            .cloned())
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        let mut chats: Vec<Chat> = self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn update_title(
        &self,
        user_id: &str,
        chat_id: &Uuid,
        title: &str,
    ) -> Result<Chat, RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let chat = chats
            .iter_mut()
            .find(|c| c.user_id == user_id && c.id == *chat_id)
            .ok_or(RepositoryError::NotFound)?;
        chat.title = title.to_string();
        chat.updated_at = Utc::now();
        Ok(chat.clone())
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &Uuid) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let before = chats.len();
        chats.retain(|c| !(c.user_id == user_id && c.id == *chat_id));
        if chats.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.messages
            .lock()
            .unwrap()
            .retain(|m| m.chat_id != *chat_id);
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        let mut chats = self.chats.lock().unwrap();
        if let Some(chat) = chats.iter_mut().find(|c| c.id == message.chat_id) {
            chat.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get_messages(&self, chat_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == *chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }
}

/// Vec-backed memory repository.
#[derive(Default)]
pub(crate) struct InMemoryMemoryRepository {
    memories: Mutex<Vec<Memory>>,
}

impl MemoryRepository for InMemoryMemoryRepository {
    async fn create(&self, memory: &Memory) -> Result<Memory, RepositoryError> {
        self.memories.lock().unwrap().push(memory.clone());
        Ok(memory.clone())
    }

    async fn get(
        &self,
        user_id: &str,
        memory_id: &Uuid,
    ) -> Result<Option<Memory>, RepositoryError> {
        Ok(self
            .memories
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.user_id == user_id && m.id == *memory_id)
            .cloned())
    }

    async fn list(
        &self,
        user_id: &str,
        enabled_only: bool,
    ) -> Result<Vec<Memory>, RepositoryError> {
        let mut memories: Vec<Memory> = self
            .memories
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id && (!enabled_only || m.enabled))
            .cloned()
            .collect();
        memories.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(memories)
    }

    async fn update(
        &self,
        user_id: &str,
        memory_id: &Uuid,
        patch: &MemoryPatch,
    ) -> Result<Memory, RepositoryError> {
        let mut memories = self.memories.lock().unwrap();
        let memory = memories
            .iter_mut()
            .find(|m| m.user_id == user_id && m.id == *memory_id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(content) = &patch.content {
            memory.content = content.clone();
        }
        if let Some(enabled) = patch.enabled {
            memory.enabled = enabled;
        }
        Ok(memory.clone())
    }

    async fn delete(&self, user_id: &str, memory_id: &Uuid) -> Result<(), RepositoryError> {
        let mut memories = self.memories.lock().unwrap();
        let before = memories.len();
        memories.retain(|m| !(m.user_id == user_id && m.id == *memory_id));
        if memories.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Vec-backed model config repository.
#[derive(Default)]
pub(crate) struct InMemoryModelConfigRepository {
    configs: Mutex<Vec<ModelConfig>>,
}

impl ModelConfigRepository for InMemoryModelConfigRepository {
    async fn upsert(&self, config: &ModelConfig) -> Result<ModelConfig, RepositoryError> {
        let mut configs = self.configs.lock().unwrap();
        if config.is_default {
            for existing in configs.iter_mut() {
                existing.is_default = false;
            }
        }
        configs.retain(|c| c.id != config.id);
        configs.push(config.clone());
        Ok(config.clone())
    }

    async fn get(&self, config_id: &str) -> Result<Option<ModelConfig>, RepositoryError> {
        Ok(self
            .configs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == config_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<ModelConfig>, RepositoryError> {
        let mut configs = self.configs.lock().unwrap().clone();
        configs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(configs)
    }

    async fn delete(&self, config_id: &str) -> Result<(), RepositoryError> {
        let mut configs = self.configs.lock().unwrap();
        let before = configs.len();
        configs.retain(|c| c.id != config_id);
        if configs.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_default(&self) -> Result<Option<ModelConfig>, RepositoryError> {
        let mut configs = self.configs.lock().unwrap().clone();
        configs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(configs
            .iter()
            .find(|c| c.is_default)
            .or_else(|| configs.first())
            .cloned())
    }
}
