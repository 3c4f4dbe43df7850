//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`. Middleware: CORS, tracing.

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Chat CRUD
        .route(
            "/chats",
            get(handlers::chat::list_chats).post(handlers::chat::create_chat),
        )
        .route(
            "/chats/{id}",
            get(handlers::chat::get_chat)
                .patch(handlers::chat::update_chat)
                .delete(handlers::chat::delete_chat),
        )
        // Chat streaming
        .route(
            "/chat/completions",
            post(handlers::completion::create_completion),
        )
        // Memories
        .route(
            "/memories",
            get(handlers::memory::list_memories).post(handlers::memory::create_memory),
        )
        .route(
            "/memories/{id}",
            patch(handlers::memory::update_memory).delete(handlers::memory::delete_memory),
        )
        // Model configurations
        .route(
            "/models",
            get(handlers::model::list_models).post(handlers::model::create_model),
        )
        .route(
            "/models/{id}",
            get(handlers::model::get_model).delete(handlers::model::delete_model),
        )
        .route(
            "/models/{id}/set-default",
            post(handlers::model::set_default_model),
        );

    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Service identity check.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "Parley API",
    }))
}

/// GET /api/health - Simple health check endpoint.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
