//! LlmProvider trait definition.
//!
//! The core abstraction every LLM backend implements. Uses RPITIT for
//! `complete`; `stream` returns a boxed stream so the yielded events can
//! outlive the borrow of the provider.

use std::pin::Pin;

use futures_util::Stream;

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// Trait for LLM provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) for `complete`.
/// Implementations live in parley-infra (e.g., `BedrockProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    ///
    /// The request is taken by value so implementations can move it into
    /// the returned `'static` stream.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
