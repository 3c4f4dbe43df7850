//! LLM provider abstraction, context assembly, and the inference client.

pub mod client;
pub mod context;
pub mod provider;

pub use client::InferenceClient;
pub use provider::LlmProvider;
