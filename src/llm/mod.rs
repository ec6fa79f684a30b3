//! LLM backend capability consumed by debate agents.
//!
//! The engine never talks HTTP itself. It consumes any backend through the
//! [`LlmProvider`] trait: a single `generate` call that takes an ordered
//! conversation, a model name, a temperature and a system prompt, and
//! returns the generated text together with token counts, cost and latency.
//! Retries, rate limiting and per-call timeouts are the responsibility of
//! the provider implementation; the orchestrator treats any failure as a
//! fatal agent-level error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (e.g., "system", "user", "assistant").
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request for text generation from an LLM backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier to use for generation.
    pub model: String,
    /// Conversation messages, in order.
    pub messages: Vec<Message>,
    /// Sampling temperature (0.0 - 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// System prompt applied to the whole conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Create a new generation request with default parameters.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            system: None,
            max_tokens: None,
        }
    }

    /// Set the temperature for this request.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt for this request.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the max tokens for this request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text content.
    pub content: String,
    /// Number of tokens in the prompt.
    pub input_tokens: u32,
    /// Number of tokens generated.
    pub output_tokens: u32,
    /// Cost of the call in USD.
    pub cost: f64,
    /// End-to-end latency of the call in milliseconds.
    pub latency_ms: f64,
}

impl GenerationResponse {
    /// Total tokens consumed by the call.
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for LLM backends that can generate text.
///
/// Implementations must fail with a distinguishable [`LlmError`] on
/// network, timeout or auth failure, and must not silently truncate or
/// retry without signaling.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used for message attribution and cost grouping.
    fn name(&self) -> &str;

    /// Generate a response for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, "system");
        assert_eq!(Message::user("u").role, "user");
        assert_eq!(Message::assistant("a").role, "assistant");
        assert_eq!(Message::user("hello").content, "hello");
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("test-model", vec![Message::user("hi")])
            .with_temperature(0.3)
            .with_system("You are terse.")
            .with_max_tokens(256);

        assert_eq!(request.model, "test-model");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.system.as_deref(), Some("You are terse."));
        assert_eq!(request.max_tokens, Some(256));
    }

    #[test]
    fn test_response_total_tokens() {
        let response = GenerationResponse {
            content: "out".to_string(),
            input_tokens: 120,
            output_tokens: 80,
            cost: 0.002,
            latency_ms: 450.0,
        };
        assert_eq!(response.total_tokens(), 200);
    }
}
