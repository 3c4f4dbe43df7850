//! Wire types for the Bedrock Runtime API.
//!
//! The request body follows the Anthropic messages schema with an
//! `anthropic_version` marker; the model is addressed in the URL path,
//! never in the body.

use serde::{Deserialize, Serialize};

/// Request body for `invoke` and `invoke-with-response-stream`.
#[derive(Debug, Serialize)]
pub struct BedrockRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// A single message in the request body.
#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Non-streaming `invoke` response.
#[derive(Debug, Deserialize)]
pub struct InvokeResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
}

/// A content block in a non-streaming response. Only text blocks carry
/// output we relay; anything else is skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Wrapper payload of a binary-stream `chunk` frame: base64 of the inner
/// Anthropic JSON event.
#[derive(Debug, Deserialize)]
pub struct BedrockStreamChunk {
    pub bytes: String,
}

/// `content_block_delta` event payload. The delta is parsed loosely so
/// unfamiliar delta kinds are skipped instead of failing the stream.
#[derive(Debug, Deserialize)]
pub struct ContentBlockDeltaPayload {
    pub delta: EventDelta,
}

#[derive(Debug, Deserialize)]
pub struct EventDelta {
    #[serde(rename = "type")]
    pub delta_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// `error` event payload.
#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
