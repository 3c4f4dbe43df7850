//! Infrastructure layer for Parley.
//!
//! Contains implementations of the repository traits defined in `parley-core`
//! (SQLite storage) and the AWS Bedrock LLM provider.

pub mod config;
pub mod llm;
pub mod sqlite;
