//! LLM provider implementations.

pub mod bedrock;

pub use bedrock::BedrockProvider;
