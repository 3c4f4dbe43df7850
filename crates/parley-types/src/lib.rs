//! Shared domain types for Parley.
//!
//! Pure data definitions used across all layers: chat sessions and messages,
//! user memories, model configurations, LLM request/response shapes, the
//! completion event enum, and error types. No I/O.

pub mod chat;
pub mod error;
pub mod event;
pub mod llm;
pub mod memory;
pub mod model;
