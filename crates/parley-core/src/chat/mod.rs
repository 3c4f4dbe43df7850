//! Chat lifecycle, memory management, and the completion orchestrator.

pub mod service;

pub use service::{ChatService, CompletionError, CompletionParams};
