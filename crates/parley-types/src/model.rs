//! Model configuration types.
//!
//! A model config names an upstream model identifier plus the sampling
//! parameters used when completing with it. Exactly one config is the
//! default used when a completion request names no model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default token budget when a config omits one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature when a config omits one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A named, tunable model configuration.
///
/// `id` is a caller-chosen slug (e.g. "claude-opus-4"), not a generated
/// UUID, so configs can be addressed stably in requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub is_default: bool,
    pub updated_at: DateTime<Utc>,
}
