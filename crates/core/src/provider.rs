//! Provider trait, the abstraction over chat-completion backends.
//!
//! A Provider knows how to send a conversation to a model and get the
//! complete response back. The only production implementation speaks the
//! OpenAI-compatible wire format that OpenRouter exposes.

use crate::error::ProviderError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "x-ai/grok-4-fast")
    pub model: String,

    /// System message first, then history, then the current user message
    pub messages: Vec<ChatMessage>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Nucleus-sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated assistant text
    pub content: String,

    /// Token usage statistics, when the provider reports them
    pub usage: Option<Usage>,

    /// Which model the request was sent to
    pub model: String,
}

/// Token usage information as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The completion gateway calls `complete()` once per attempt without
/// knowing which backend sits behind it, so tests can substitute a mock.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    ///
    /// Any error is an upstream failure and makes the caller eligible for
    /// its model fallback.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_sampling_fields() {
        let req = ProviderRequest {
            model: "x-ai/grok-4-fast".into(),
            messages: vec![ChatMessage::system("be brief")],
            temperature: default_temperature(),
            max_tokens: None,
            top_p: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("top_p").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn request_temperature_defaults_when_absent() {
        let req: ProviderRequest =
            serde_json::from_str(r#"{"model":"m","messages":[]}"#).unwrap();
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }
}
