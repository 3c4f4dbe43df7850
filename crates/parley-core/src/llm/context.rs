//! System prompt and message assembly for completion requests.
//!
//! The system prompt stacks an optional persona prompt and the user's
//! enabled memories. When both are absent a generic fallback keeps the
//! request well-formed.

use parley_types::chat::ChatMessage;
use parley_types::llm::Message;
use parley_types::memory::Memory;

/// System prompt used when no persona and no memories apply.
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Build the system prompt and the provider-ready message list.
///
/// Memories are rendered as `- <content>` bullets under a fixed header.
/// Disabled memories are filtered here even if the caller already did,
/// so a stale read can never leak one into the prompt.
pub fn build_context(
    history: &[ChatMessage],
    memories: &[Memory],
    persona: Option<&str>,
) -> (String, Vec<Message>) {
    let mut system_parts: Vec<String> = Vec::new();

    if let Some(persona) = persona {
        system_parts.push(persona.to_string());
    }

    let enabled: Vec<&Memory> = memories.iter().filter(|m| m.enabled).collect();
    if !enabled.is_empty() {
        let memory_text = enabled
            .iter()
            .map(|m| format!("- {}", m.content))
            .collect::<Vec<_>>()
            .join("\n");
        system_parts.push(format!(
            "\nHere are some things to remember about the user:\n{memory_text}\n\nUse this context to personalize your responses when relevant.\n"
        ));
    }

    let system = if system_parts.is_empty() {
        FALLBACK_SYSTEM_PROMPT.to_string()
    } else {
        system_parts.join("\n\n")
    };

    let messages = history
        .iter()
        .map(|m| Message {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect();

    (system, messages)
}
