//! SSE streaming completion endpoint.
//!
//! POST /api/chat/completions
//!
//! Persists the user message, streams the assistant reply as Server-Sent
//! Events, and persists the full reply when the stream ends. Inference
//! failures never fail the HTTP response; they surface as an inline
//! `**Error:**` fragment in the content stream.
//!
//! SSE event types:
//! - `control` — opens the stream: `{ "chat_id": "...", "is_new": bool }`
//! - `content` — incremental text: `{ "content": "..." }`
//! - `title`   — generated title for a new chat: `{ "title": "..." }`
//! - unnamed `[DONE]` data line — stream complete

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;
use uuid::Uuid;

use parley_core::chat::service::CompletionParams;

use crate::http::error::AppError;
use crate::state::{AppState, DEFAULT_USER_ID};

/// Request body for the streaming completion endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    /// The user message to send.
    pub content: String,
    /// Existing chat to continue; if absent, a new chat is created.
    pub chat_id: Option<Uuid>,
    /// Model config to use; if absent, the default config is used.
    pub selected_model_id: Option<String>,
}

/// POST /api/chat/completions - SSE streaming completion.
pub async fn create_completion(
    State(state): State<AppState>,
    Json(body): Json<MessageCreate>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let params = CompletionParams {
        content: body.content,
        chat_id: body.chat_id,
        selected_model_id: body.selected_model_id,
    };

    let events = state
        .chat_service
        .begin_completion(DEFAULT_USER_ID, params)
        .await?;

    let sse_stream = events.map(|event| {
        let sse = match event.event_name() {
            Some(name) => {
                let data = serde_json::to_string(&event).unwrap_or_default();
                Event::default().event(name).data(data)
            }
            // Done is a bare data line so clients can stop on "[DONE]".
            None => Event::default().data("[DONE]"),
        };
        Ok::<_, Infallible>(sse)
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
