//! BedrockProvider -- concrete [`LlmProvider`] implementation for AWS Bedrock.
//!
//! Sends requests to the AWS Bedrock Runtime API using Bearer token
//! authentication. Supports both non-streaming (`invoke`) and streaming
//! (`invoke-with-response-stream`) modes. The model is resolved per
//! request, so one provider serves every configured model.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent,
};

use super::streaming::create_bedrock_stream;
use super::types::{BedrockRequest, ContentBlock, InvokeResponse, WireMessage};

/// AWS Bedrock Claude LLM provider.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output.
pub struct BedrockProvider {
    client: reqwest::Client,
    api_key: SecretString,
    region: String,
}

impl BedrockProvider {
    /// The Anthropic API version for Bedrock.
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    /// Prefix used to identify Bedrock API keys.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// Create a new Bedrock provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - AWS Bedrock bearer token wrapped in SecretString.
    ///   If the key starts with `bedrock-api-key-`, the prefix is stripped
    ///   and the remainder is used as the Bearer token. The token is a
    ///   base64-encoded presigned URL containing SigV4 params.
    /// * `region` - AWS region (e.g., "us-east-1"). If the token's embedded
    ///   credential scope specifies a different region, that region is used
    ///   instead.
    pub fn new(api_key: SecretString, region: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        // Strip the bedrock-api-key- prefix so only the base64 token is used
        // as the Bearer token in HTTP requests.
        let raw_key = api_key.expose_secret().to_string();
        let token_part = raw_key.strip_prefix(Self::KEY_PREFIX).unwrap_or(&raw_key);
        let effective_region = Self::detect_region_from_token(token_part).unwrap_or(region);

        Self {
            client,
            api_key: SecretString::from(token_part.to_string()),
            region: effective_region,
        }
    }

    /// Try to extract the AWS region from a base64-encoded presigned URL token.
    ///
    /// The token decodes to a URL like:
    /// `bedrock.amazonaws.com/?...&X-Amz-Credential=AKIA.../20260212/us-east-1/bedrock/aws4_request&...`
    ///
    /// Returns `Some(region)` if found, `None` otherwise.
    fn detect_region_from_token(token: &str) -> Option<String> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token)
            .ok()?;
        let text = String::from_utf8(decoded).ok()?;

        // Look for X-Amz-Credential=.../<date>/<region>/bedrock/aws4_request
        let cred_start = text.find("X-Amz-Credential=")?;
        let cred_value = &text[cred_start + "X-Amz-Credential=".len()..];
        // Format: <access-key>/<date>/<region>/<service>/aws4_request
        let parts: Vec<&str> = cred_value.split('/').collect();
        if parts.len() >= 3 {
            let region = parts[2].split('&').next().unwrap_or(parts[2]);
            tracing::info!(region = %region, "Detected region from Bedrock bearer token");
            Some(region.to_string())
        } else {
            None
        }
    }

    /// Convert a model name to a Bedrock inference profile ID.
    ///
    /// Bedrock cross-region inference profiles use a region shorthand prefix
    /// (e.g., `eu.`, `us.`) before the model ID. The `region` parameter is
    /// the full AWS region (e.g., `eu-west-1`); the shorthand is extracted
    /// from the first segment before the dash.
    ///
    /// If the model already contains a `.` (e.g., `us.anthropic.claude-...`
    /// or `anthropic.claude-...`), it is returned as-is. Configured model
    /// ids are normally fully qualified already; bare names are a
    /// convenience.
    pub fn to_bedrock_model_id(model: &str, region: &str) -> String {
        if model.contains('.') {
            model.to_string()
        } else {
            // Extract region shorthand: "eu-west-1" → "eu", "us-east-1" → "us"
            let region_prefix = region.split('-').next().unwrap_or("us");
            format!("{region_prefix}.anthropic.{model}-v1:0")
        }
    }

    /// Build the full Bedrock Runtime URL for a model and action.
    fn url(&self, model: &str, action: &str) -> String {
        let model_id = Self::to_bedrock_model_id(model, &self.region);
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/{}",
            self.region, model_id, action
        )
    }

    /// Convert a generic [`CompletionRequest`] into a [`BedrockRequest`].
    fn to_bedrock_request(&self, request: &CompletionRequest) -> BedrockRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        BedrockRequest {
            anthropic_version: Self::API_VERSION.to_string(),
            max_tokens: request.max_tokens,
            messages,
            system: request.system.clone(),
            temperature: request.temperature,
        }
    }
}

/// Map a non-success HTTP status to an [`LlmError`].
pub(super) fn map_status_error(status: u16, error_body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed(format!(
            "Bedrock authentication failed (HTTP {status}): {error_body}"
        )),
        429 => LlmError::RateLimited,
        529 => LlmError::Overloaded(error_body),
        s if s >= 500 => LlmError::Provider {
            message: format!("Bedrock server error HTTP {status}: {error_body}"),
        },
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {error_body}"),
        },
    }
}

// BedrockProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state.

impl LlmProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_bedrock_request(request);
        let url = self.url(&request.model, "invoke");

        tracing::debug!(url = %url, region = %self.region, "Bedrock invoke request");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, url = %url, "Bedrock API error response");
            return Err(map_status_error(status.as_u16(), error_body));
        }

        let invoke_resp: InvokeResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = invoke_resp
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = match invoke_resp.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Ok(CompletionResponse {
            id: invoke_resp.id,
            content,
            model: invoke_resp.model,
            stop_reason,
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.to_bedrock_request(&request);
        let url = self.url(&request.model, "invoke-with-response-stream");

        create_bedrock_stream(&self.client, &url, body, &self.api_key)
    }
}
