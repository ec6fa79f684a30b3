//! Shared agent internals.
//!
//! [`AgentCore`] carries the configuration every agent variant needs and
//! the two helpers they all share: rendering the transcript as an LLM
//! conversation, and wrapping a raw provider response into a
//! [`DebateMessage`] stamped with the current round.

use std::sync::Arc;

use chrono::Utc;

use crate::error::LlmError;
use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider, Message};
use crate::state::{AgentRole, DebateMessage, DebateState, MessageMetadata};

/// Configuration and helpers shared by all agent variants via composition.
pub struct AgentCore {
    /// Unique agent identifier.
    pub agent_id: String,
    /// Bound LLM backend.
    pub provider: Arc<dyn LlmProvider>,
    /// Model name passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl AgentCore {
    /// Create a new core with the given identity and backend binding.
    pub fn new(
        agent_id: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            provider,
            model: model.into(),
            temperature,
            system_prompt_override: None,
        }
    }

    /// The override if configured, otherwise the supplied role default.
    pub fn system_prompt_or(&self, default_prompt: &str) -> String {
        self.system_prompt_override
            .clone()
            .unwrap_or_else(|| default_prompt.to_string())
    }

    /// Render prior transcript messages as an LLM conversation.
    ///
    /// Each message becomes `[ROLE - agent_id]\ncontent`, tagged `assistant`
    /// when authored by this agent and `user` otherwise. With `include_own`
    /// false, this agent's own prior messages are skipped entirely; judge
    /// and moderator prompts use that form to avoid self-attribution.
    pub fn conversation_history(&self, state: &DebateState, include_own: bool) -> Vec<Message> {
        state
            .messages
            .iter()
            .filter(|msg| include_own || msg.agent_id != self.agent_id)
            .map(|msg| {
                let content = format!(
                    "[{} - {}]\n{}",
                    msg.agent_role.as_str().to_uppercase(),
                    msg.agent_id,
                    msg.content
                );
                if msg.agent_id == self.agent_id {
                    Message::assistant(content)
                } else {
                    Message::user(content)
                }
            })
            .collect()
    }

    /// Call the bound provider with this agent's model, temperature and the
    /// given system prompt.
    pub async fn complete(
        &self,
        messages: Vec<Message>,
        system: String,
    ) -> Result<GenerationResponse, LlmError> {
        let request = GenerationRequest::new(self.model.clone(), messages)
            .with_temperature(self.temperature)
            .with_system(system);
        self.provider.generate(request).await
    }

    /// Wrap a provider response into a transcript message, stamping the
    /// state's current round and the provider metadata.
    pub fn wrap_response(
        &self,
        role: AgentRole,
        state: &DebateState,
        response: GenerationResponse,
    ) -> DebateMessage {
        DebateMessage {
            agent_id: self.agent_id.clone(),
            agent_role: role,
            provider: self.provider.name().to_string(),
            model: self.model.clone(),
            content: response.content,
            round: state.current_round,
            timestamp: Utc::now(),
            metadata: MessageMetadata {
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
                cost: response.cost,
                latency_ms: response.latency_ms,
            },
        }
    }
}
