//! Inference client: fail-soft wrappers over an `LlmProvider`.
//!
//! Remote inference failures never surface as errors here. Streaming
//! failures become a single inline `**Error:**` fragment, one-shot
//! failures become an `Error:` string, and title generation falls back
//! to `"New Chat"`. Callers treat every outcome as ordinary text.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use parley_types::chat::ChatMessage;
use parley_types::llm::{CompletionRequest, Message, MessageRole, StreamEvent};
use parley_types::memory::Memory;
use tracing::warn;

use crate::llm::context::build_context;
use crate::llm::provider::LlmProvider;

/// Fallback title when generation fails or produces nothing.
pub const FALLBACK_TITLE: &str = "New Chat";

/// Max seed characters fed to the title prompt.
const TITLE_SEED_CHARS: usize = 500;

/// Max characters kept from a generated title.
const TITLE_MAX_CHARS: usize = 100;

/// Fail-soft inference client over an LLM provider.
pub struct InferenceClient<P: LlmProvider> {
    provider: Arc<P>,
}

impl<P: LlmProvider> InferenceClient<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Stream a completion as plain text fragments.
    ///
    /// Forward-only and single-consumption. On any provider error the
    /// stream yields one `\n\n**Error:** <msg>` fragment and ends.
    ///
    /// The request is built eagerly, so the returned stream captures no
    /// argument borrows (`use<P>`) and may outlive them all.
    pub fn complete_streaming(
        &self,
        history: &[ChatMessage],
        memories: &[Memory],
        model_id: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> impl Stream<Item = String> + Send + use<P> {
        let (system, messages) = build_context(history, memories, None);
        let request = CompletionRequest {
            model: model_id.to_string(),
            messages,
            system: Some(system),
            max_tokens,
            temperature: Some(temperature),
            stream: true,
        };

        let mut inner = self.provider.stream(request);
        async_stream::stream! {
            while let Some(event) = inner.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => yield text,
                    Ok(StreamEvent::Done) => break,
                    Err(e) => {
                        warn!(error = %e, "streaming completion failed");
                        yield format!("\n\n**Error:** {e}");
                        break;
                    }
                }
            }
        }
    }

    /// Run a non-streaming completion, returning the full text.
    ///
    /// Errors become an `Error: <msg>` string rather than propagating.
    pub async fn complete_once(
        &self,
        history: &[ChatMessage],
        memories: &[Memory],
        model_id: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> String {
        let (system, messages) = build_context(history, memories, None);
        let request = CompletionRequest {
            model: model_id.to_string(),
            messages,
            system: Some(system),
            max_tokens,
            temperature: Some(temperature),
            stream: false,
        };

        match self.provider.complete(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "completion failed");
                format!("Error: {e}")
            }
        }
    }

    /// Generate a short chat title from the first user message.
    ///
    /// One-shot LLM call at low temperature; the result is trimmed of
    /// whitespace and surrounding quotes and capped at 100 characters.
    /// Any failure or empty output yields `"New Chat"`.
    #[tracing::instrument(name = "generate_title", skip(self, first_message), fields(model = %model_id))]
    pub async fn generate_title(&self, first_message: &str, model_id: &str) -> String {
        let seed: String = first_message.chars().take(TITLE_SEED_CHARS).collect();
        let prompt = format!(
            "Generate a very short title (3-6 words) for a chat that starts with this message:\n\n\"{seed}\"\n\nRespond with ONLY the title, no quotes or extra text."
        );

        let request = CompletionRequest {
            model: model_id.to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: prompt,
            }],
            system: None,
            max_tokens: 50,
            temperature: Some(0.5),
            stream: false,
        };

        match self.provider.complete(&request).await {
            Ok(response) => {
                let title = response
                    .content
                    .trim()
                    .trim_matches('"')
                    .trim_matches('\'')
                    .trim();
                if title.is_empty() {
                    FALLBACK_TITLE.to_string()
                } else {
                    title.chars().take(TITLE_MAX_CHARS).collect()
                }
            }
            Err(e) => {
                warn!(error = %e, "title generation failed");
                FALLBACK_TITLE.to_string()
            }
        }
    }
}
