//! AWS Bedrock event stream parser and async stream adapter.
//!
//! Bedrock streaming uses the AWS event stream binary protocol (not SSE).
//! Each frame has the layout:
//!
//! ```text
//! [total_len:4][headers_len:4][prelude_crc:4][headers...][payload...][msg_crc:4]
//! ```
//!
//! For `chunk` events the payload is `{"bytes":"<base64>"}` where the
//! base64-decoded content is an Anthropic-style JSON event (e.g.
//! `{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}`).
//!
//! This module provides a minimal parser that extracts events without pulling
//! in the full AWS SDK.

use std::pin::Pin;

use base64::Engine;
use futures_util::{Stream, StreamExt};

use parley_types::llm::{LlmError, StreamEvent};

use super::types::{BedrockRequest, BedrockStreamChunk, ContentBlockDeltaPayload, ErrorPayload};

/// Parsed header from a binary event stream frame.
#[derive(Debug)]
struct EventHeader {
    name: String,
    value: String,
}

/// Parse binary headers from an AWS event stream frame.
///
/// Header format: `[name_len:1][name:N][type:1][value_len:2][value:M]`
/// We only handle type 7 (string) which is what Bedrock uses.
fn parse_headers(mut buf: &[u8]) -> Vec<EventHeader> {
    let mut headers = Vec::new();
    while !buf.is_empty() {
        let name_len = buf[0] as usize;
        buf = &buf[1..];
        if buf.len() < name_len {
            break;
        }
        let name = String::from_utf8_lossy(&buf[..name_len]).to_string();
        buf = &buf[name_len..];

        if buf.is_empty() {
            break;
        }
        let header_type = buf[0];
        buf = &buf[1..];

        if header_type == 7 {
            // String type: [value_len:2][value:M]
            if buf.len() < 2 {
                break;
            }
            let value_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
            buf = &buf[2..];
            if buf.len() < value_len {
                break;
            }
            let value = String::from_utf8_lossy(&buf[..value_len]).to_string();
            buf = &buf[value_len..];
            headers.push(EventHeader { name, value });
        } else {
            // Unknown header types have unknown lengths, so bail
            break;
        }
    }
    headers
}

/// Parse one binary event stream frame from the buffer.
///
/// Returns `Ok(Some((event_type, payload_bytes, bytes_consumed)))` for a
/// complete frame, `Ok(None)` when the buffer doesn't hold a complete
/// frame yet, or an error when the prelude is malformed (there is no way
/// to resync the stream after a corrupt length field).
fn parse_event_stream_frame(buf: &[u8]) -> Result<Option<(String, Vec<u8>, usize)>, LlmError> {
    if buf.len() < 12 {
        return Ok(None); // Need at least the prelude
    }

    let total_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let headers_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    // bytes 8..12 = prelude CRC (skip)

    // The smallest legal frame is a 12-byte prelude plus the 4-byte message
    // CRC, and the declared headers must fit inside the declared total.
    if total_len < 16 || 12 + headers_len + 4 > total_len {
        return Err(LlmError::Stream(format!(
            "malformed event stream frame: total_len={total_len}, headers_len={headers_len}"
        )));
    }

    if buf.len() < total_len {
        return Ok(None); // Incomplete frame
    }

    let headers_start = 12;
    let headers_end = headers_start + headers_len;
    let payload_end = total_len - 4; // last 4 bytes = message CRC

    let headers = parse_headers(&buf[headers_start..headers_end]);
    let payload = buf[headers_end..payload_end].to_vec();

    let event_type = headers
        .iter()
        .find(|h| h.name == ":event-type" || h.name == ":exception-type")
        .map(|h| h.value.clone())
        .unwrap_or_default();

    Ok(Some((event_type, payload, total_len)))
}

/// Process one decoded Anthropic JSON event.
///
/// Only text deltas and the stop marker become [`StreamEvent`]s; every
/// other event type (message bookkeeping, pings, non-text deltas) is
/// skipped so new upstream event kinds never break the stream.
fn process_anthropic_event(
    event_type: &str,
    json_data: &str,
) -> Result<Option<StreamEvent>, LlmError> {
    match event_type {
        "content_block_delta" => {
            let payload: ContentBlockDeltaPayload = serde_json::from_str(json_data)
                .map_err(|e| LlmError::Deserialization(format!("content_block_delta: {e}")))?;
            if payload.delta.delta_type == "text_delta" {
                if let Some(text) = payload.delta.text {
                    return Ok(Some(StreamEvent::TextDelta { text }));
                }
            }
            Ok(None)
        }

        "message_stop" => Ok(Some(StreamEvent::Done)),

        "error" => {
            let payload: ErrorPayload = serde_json::from_str(json_data)
                .map_err(|e| LlmError::Deserialization(format!("error event: {e}")))?;
            Err(match payload.error.error_type.as_str() {
                "overloaded_error" => LlmError::Overloaded(payload.error.message),
                "rate_limit_error" => LlmError::RateLimited,
                "authentication_error" => LlmError::AuthenticationFailed(payload.error.message),
                _ => LlmError::Provider {
                    message: payload.error.message,
                },
            })
        }

        "ping" | "message_start" | "message_delta" | "content_block_start"
        | "content_block_stop" => Ok(None),

        unknown => {
            tracing::debug!(event_type = unknown, "unknown Bedrock event type, skipping");
            Ok(None)
        }
    }
}

/// Create a streaming connection to the AWS Bedrock Runtime API.
///
/// Sends the HTTP request, checks the response status, then reads the
/// binary event stream body. Each `chunk` frame's payload is base64-decoded
/// to reveal the inner Anthropic JSON event.
///
/// # Arguments
///
/// * `client` - Shared reqwest HTTP client
/// * `url` - Full Bedrock Runtime URL (e.g., `.../invoke-with-response-stream`)
/// * `body` - Serialized Bedrock request
/// * `api_key` - Bearer token wrapped in SecretString
pub fn create_bedrock_stream(
    client: &reqwest::Client,
    url: &str,
    body: BedrockRequest,
    api_key: &secrecy::SecretString,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    let client = client.clone();
    let url = url.to_string();
    let api_key_str = secrecy::ExposeSecret::expose_secret(api_key).to_string();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key_str))
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
            tracing::warn!(status = %status, body = %error_body, "Bedrock stream API error response");
            Err(super::client::map_status_error(status.as_u16(), error_body))?;
            unreachable!()
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer = Vec::new();
        let mut finished = false;

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = chunk_result.map_err(|e| LlmError::Stream(format!("response body read: {e}")))?;
            buffer.extend_from_slice(&chunk);

            // Parse as many complete frames as possible from the buffer
            while let Some((event_type, payload, consumed)) = parse_event_stream_frame(&buffer)? {
                buffer.drain(..consumed);

                if event_type != "chunk" {
                    if !event_type.is_empty() {
                        tracing::debug!(event_type = %event_type, "non-chunk bedrock frame, skipping");
                    }
                    continue;
                }

                // Payload is JSON: {"bytes":"<base64>"}
                let stream_chunk: BedrockStreamChunk = serde_json::from_slice(&payload)
                    .map_err(|e| LlmError::Deserialization(format!("bedrock chunk wrapper: {e}")))?;

                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(&stream_chunk.bytes)
                    .map_err(|e| LlmError::Deserialization(format!("base64 decode: {e}")))?;

                let json_str = String::from_utf8(decoded)
                    .map_err(|e| LlmError::Deserialization(format!("utf8 decode: {e}")))?;

                // The decoded JSON has a "type" field naming the Anthropic event
                let event_json: serde_json::Value = serde_json::from_str(&json_str)
                    .map_err(|e| LlmError::Deserialization(format!("inner json: {e}")))?;
                let inner_type = event_json
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string();

                if let Some(event) = process_anthropic_event(&inner_type, &json_str)? {
                    let done = matches!(event, StreamEvent::Done);
                    yield event;
                    if done {
                        finished = true;
                        break;
                    }
                }
            }

            if finished {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_frame(event_type: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut headers_buf = Vec::new();
        let name = b":event-type";
        headers_buf.push(name.len() as u8);
        headers_buf.extend_from_slice(name);
        headers_buf.push(7); // string type
        headers_buf.extend_from_slice(&(event_type.len() as u16).to_be_bytes());
        headers_buf.extend_from_slice(event_type);

        let headers_len = headers_buf.len() as u32;
        let total_len = 12 + headers_buf.len() + payload.len() + 4;

        let mut frame = Vec::new();
        frame.extend_from_slice(&(total_len as u32).to_be_bytes());
        frame.extend_from_slice(&headers_len.to_be_bytes());
        frame.extend_from_slice(&[0u8; 4]); // prelude CRC (dummy)
        frame.extend_from_slice(&headers_buf);
        frame.extend_from_slice(payload);
        frame.extend_from_slice(&[0u8; 4]); // message CRC (dummy)
        frame
    }

    #[test]
    fn test_parse_headers_single_string() {
        let mut buf = Vec::new();
        let name = b":event-type";
        buf.push(name.len() as u8);
        buf.extend_from_slice(name);
        buf.push(7); // string type
        let value = b"chunk";
        buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
        buf.extend_from_slice(value);

        let headers = parse_headers(&buf);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].name, ":event-type");
        assert_eq!(headers[0].value, "chunk");
    }

    #[test]
    fn test_parse_event_stream_frame() {
        let payload = b"{\"bytes\":\"dGVzdA==\"}";
        let frame = build_frame(b"chunk", payload);

        let (event_type, payload_bytes, consumed) =
            parse_event_stream_frame(&frame).unwrap().unwrap();
        assert_eq!(event_type, "chunk");
        assert_eq!(consumed, frame.len());
        assert_eq!(payload_bytes, payload);
    }

    #[test]
    fn test_parse_event_stream_frame_incomplete() {
        let buf = vec![0u8; 8]; // Too short for even the prelude
        assert!(parse_event_stream_frame(&buf).unwrap().is_none());

        let frame = build_frame(b"chunk", b"{}");
        // Truncated frame: parser must wait for more data
        assert!(parse_event_stream_frame(&frame[..frame.len() - 6])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_two_frames_back_to_back() {
        let mut buf = build_frame(b"chunk", b"one");
        buf.extend_from_slice(&build_frame(b"chunk", b"two"));

        let (_, first, consumed) = parse_event_stream_frame(&buf).unwrap().unwrap();
        assert_eq!(first, b"one");
        let (_, second, _) = parse_event_stream_frame(&buf[consumed..]).unwrap().unwrap();
        assert_eq!(second, b"two");
    }

    #[test]
    fn test_undersized_total_len_is_an_error() {
        // A frame can never be shorter than prelude + message CRC; a corrupt
        // length must not underflow or stall the parser.
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_be_bytes()); // total_len = 2
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&[0u8; 4]); // prelude CRC
        assert!(matches!(
            parse_event_stream_frame(&buf),
            Err(LlmError::Stream(_))
        ));
    }

    #[test]
    fn test_headers_exceeding_total_len_is_an_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&20u32.to_be_bytes());
        buf.extend_from_slice(&100u32.to_be_bytes()); // headers can't fit
        buf.extend_from_slice(&[0u8; 4]);
        assert!(matches!(
            parse_event_stream_frame(&buf),
            Err(LlmError::Stream(_))
        ));
    }

    #[test]
    fn test_process_text_delta() {
        let json =
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#;
        let event = process_anthropic_event("content_block_delta", json)
            .unwrap()
            .unwrap();
        assert!(matches!(event, StreamEvent::TextDelta { ref text } if text == "Hi"));
    }

    #[test]
    fn test_process_non_text_delta_skipped() {
        let json = r#"{"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"{"}}"#;
        let event = process_anthropic_event("content_block_delta", json).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_process_message_stop() {
        let json = r#"{"type":"message_stop"}"#;
        let event = process_anthropic_event("message_stop", json).unwrap().unwrap();
        assert!(matches!(event, StreamEvent::Done));
    }

    #[test]
    fn test_process_bookkeeping_events_skipped() {
        for (event_type, json) in [
            ("message_start", r#"{"type":"message_start","message":{}}"#),
            ("ping", r#"{"type":"ping"}"#),
            ("content_block_start", r#"{"type":"content_block_start"}"#),
        ] {
            let event = process_anthropic_event(event_type, json).unwrap();
            assert!(event.is_none(), "{event_type} should be skipped");
        }
    }

    #[test]
    fn test_process_error_auth() {
        let json = r#"{"error":{"type":"authentication_error","message":"Invalid API key"}}"#;
        let result = process_anthropic_event("error", json);
        assert!(matches!(
            result.unwrap_err(),
            LlmError::AuthenticationFailed(_)
        ));
    }

    #[test]
    fn test_process_error_overloaded() {
        let json = r#"{"error":{"type":"overloaded_error","message":"busy"}}"#;
        let result = process_anthropic_event("error", json);
        assert!(matches!(result.unwrap_err(), LlmError::Overloaded(_)));
    }
}
