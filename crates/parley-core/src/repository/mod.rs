//! Repository trait definitions ("ports").
//!
//! Implementations live in parley-infra. All traits use native async fn in
//! traits (RPITIT, Rust 2024 edition).

pub mod chat;
pub mod memory;
pub mod model;

pub use chat::ChatRepository;
pub use memory::MemoryRepository;
pub use model::ModelConfigRepository;
