//! AWS Bedrock provider: HTTP client, binary event stream parsing, wire types.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::BedrockProvider;
