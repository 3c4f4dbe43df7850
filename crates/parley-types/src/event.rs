//! Events emitted over the completion SSE stream.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single event in a chat completion stream, in emission order:
/// one `Control`, zero or more `Content` fragments, an optional `Title`
/// for newly created chats, then `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Announces the chat the stream belongs to before any content.
    Control { chat_id: Uuid, is_new: bool },
    /// A fragment of assistant output.
    Content { content: String },
    /// The generated title for a chat created by this request.
    Title { title: String },
    /// Terminal marker; nothing follows.
    Done,
}

impl ChatEvent {
    /// SSE event name for this variant. `Done` has no name: it is sent
    /// as a bare `[DONE]` data line.
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            ChatEvent::Control { .. } => Some("control"),
            ChatEvent::Content { .. } => Some("content"),
            ChatEvent::Title { .. } => Some("title"),
            ChatEvent::Done => None,
        }
    }
}
