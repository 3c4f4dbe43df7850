//! Application state wiring all services together.
//!
//! Services are generic over repository and provider traits; AppState pins
//! them to the concrete infra implementations.

use std::sync::Arc;

use parley_core::chat::service::ChatService;
use parley_core::model::service::ModelService;
use parley_infra::config::Settings;
use parley_infra::llm::BedrockProvider;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::memory::SqliteMemoryRepository;
use parley_infra::sqlite::model::SqliteModelConfigRepository;
use parley_infra::sqlite::pool::DatabasePool;

/// The single built-in user all requests act as.
pub const DEFAULT_USER_ID: &str = "default-user";

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteChatService = ChatService<
    SqliteChatRepository,
    SqliteMemoryRepository,
    SqliteModelConfigRepository,
    BedrockProvider,
>;

pub type ConcreteModelService = ModelService<SqliteModelConfigRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub model_service: Arc<ConcreteModelService>,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let settings = Settings::from_env();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&settings.data_dir).await?;

        let db_pool = DatabasePool::new(&settings.database_url()).await?;
        tracing::debug!(data_dir = %settings.data_dir.display(), "database ready");

        let provider = Arc::new(BedrockProvider::new(
            settings.bedrock_token,
            settings.aws_region,
        ));

        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMemoryRepository::new(db_pool.clone()),
            SqliteModelConfigRepository::new(db_pool.clone()),
            provider,
        );

        let model_service = ModelService::new(SqliteModelConfigRepository::new(db_pool));

        Ok(Self {
            chat_service: Arc::new(chat_service),
            model_service: Arc::new(model_service),
        })
    }
}
