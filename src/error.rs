//! Error types for debate orchestration.
//!
//! Two taxonomies cover the engine:
//! - [`LlmError`]: failures from the external LLM backend (network, timeout,
//!   auth). These abort the run and surface to the caller.
//! - [`DebateError`]: orchestration-level failures, including provider
//!   errors attributed to the agent whose call failed, and configuration
//!   errors rejected before a run starts.
//!
//! Malformed judge or moderator output is *not* an error: both agents
//! recover locally with conservative fallback values, so a run that gets
//! past configuration either completes with a verdict or fails with a
//! provider error.

use thiserror::Error;

/// Errors raised by an LLM backend while generating a response.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Empty response from provider")]
    EmptyResponse,

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while orchestrating a debate.
#[derive(Debug, Error)]
pub enum DebateError {
    /// An agent's backend call failed. Aborts the current round; a missing
    /// turn would corrupt round integrity, so this is never swallowed.
    #[error("Provider call failed for agent '{agent_id}': {source}")]
    Provider {
        agent_id: String,
        #[source]
        source: LlmError,
    },

    /// Invalid roster or settings, rejected at construction time.
    #[error("Debate configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DebateError {
    /// Wrap a backend failure with the id of the agent whose call failed.
    pub fn provider(agent_id: impl Into<String>, source: LlmError) -> Self {
        Self::Provider {
            agent_id: agent_id.into(),
            source,
        }
    }
}

/// Result type alias for agent and orchestrator operations.
pub type AgentResult<T> = Result<T, DebateError>;
