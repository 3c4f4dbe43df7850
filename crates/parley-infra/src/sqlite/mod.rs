//! SQLite persistence: split-pool database and repository implementations.

pub mod chat;
pub mod memory;
pub mod model;
pub mod pool;

pub use chat::SqliteChatRepository;
pub use memory::SqliteMemoryRepository;
pub use model::SqliteModelConfigRepository;
pub use pool::DatabasePool;
