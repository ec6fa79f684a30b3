//! Moderator agent: consensus detection and early-stop control.
//!
//! Parse failures here are fail-open: an unparseable assessment defaults to
//! "no consensus, keep debating" so a bad response never stops a debate
//! prematurely.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::core::AgentCore;
use super::Agent;
use crate::error::{AgentResult, DebateError};
use crate::llm::{LlmProvider, Message};
use crate::state::{AgentRole, DebateMessage, DebateState};
use crate::utils::json::parse_json_object;

const MODERATOR_SYSTEM_PROMPT: &str = "\
You are a debate moderator responsible for managing the discussion.
Your responsibilities:
1. Evaluate whether the debaters are making progress toward resolution
2. Identify if a consensus has been reached
3. Determine if further debate rounds are needed
4. Track the quality and relevance of arguments

You should recommend stopping the debate early if:
- Clear consensus has been reached
- Arguments are becoming repetitive
- No new information is being presented
- The positions have stabilized";

/// Structured assessment produced by the moderator for one round.
///
/// All fields default so a partially structured response still parses;
/// the defaults themselves are the fail-open values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationAssessment {
    /// Agreement across debaters, 0.0 (none) to 1.0 (full consensus).
    #[serde(default)]
    pub consensus_score: f64,
    /// Whether the moderator recommends another round.
    #[serde(default = "default_should_continue")]
    pub should_continue: bool,
    /// Why the debate should continue or stop.
    #[serde(default)]
    pub reasoning: String,
    /// Main points of disagreement.
    #[serde(default)]
    pub key_disagreements: Vec<String>,
    /// Main points of agreement.
    #[serde(default)]
    pub key_agreements: Vec<String>,
    /// Argument quality, 0.0 to 1.0.
    #[serde(default = "default_quality_score")]
    pub quality_score: f64,
}

fn default_should_continue() -> bool {
    true
}

fn default_quality_score() -> f64 {
    0.5
}

/// Parse a moderation assessment from raw response content.
///
/// Same first-`{`-to-last-`}` extraction as verdict parsing; on failure the
/// fail-open default is returned: zero consensus, continue debating.
pub fn parse_moderation(content: &str) -> ModerationAssessment {
    if let Some(assessment) = parse_json_object::<ModerationAssessment>(content) {
        return assessment;
    }

    tracing::warn!("Moderation response had no parseable assessment, failing open");
    ModerationAssessment {
        consensus_score: 0.0,
        should_continue: true,
        reasoning: "Unable to parse moderation response".to_string(),
        key_disagreements: Vec::new(),
        key_agreements: Vec::new(),
        quality_score: 0.5,
    }
}

/// Agent that scores consensus after each round and can end the debate
/// early once its threshold is met.
pub struct ModeratorAgent {
    core: AgentCore,
    consensus_threshold: f64,
}

impl ModeratorAgent {
    /// Create a moderator with a low default temperature (0.3) and a 0.8
    /// consensus threshold.
    pub fn new(
        agent_id: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            core: AgentCore::new(agent_id, provider, model, 0.3),
            consensus_threshold: 0.8,
        }
    }

    /// Set the consensus score at which debate stops early.
    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Override the role-default system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.core.system_prompt_override = Some(prompt.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.core.temperature = temperature;
        self
    }

    /// The configured consensus threshold.
    pub fn consensus_threshold(&self) -> f64 {
        self.consensus_threshold
    }

    /// Early-stop decision: threshold met, or the moderator voted to stop.
    pub fn should_stop_early(&self, assessment: &ModerationAssessment) -> bool {
        assessment.consensus_score >= self.consensus_threshold || !assessment.should_continue
    }

    /// Round status plus the current round's debater arguments, then the
    /// structured assessment instruction.
    pub(crate) fn build_prompt(&self, state: &DebateState) -> Vec<Message> {
        let current = state.current_round;
        let max_rounds = state.max_rounds;

        let mut prompt = String::from("## Debate Status\n");
        prompt.push_str(&format!("- Round: {current}/{max_rounds}\n"));
        prompt.push_str(&format!("- Topic: {}\n", state.topic));
        prompt.push_str(&format!("- Debaters: {}\n\n", state.debater_count));

        prompt.push_str("## Latest Round Arguments\n");
        for msg in state.round_messages(current) {
            if msg.agent_role == AgentRole::Debater {
                prompt.push_str(&format!("\n### {}\n{}\n", msg.agent_id, msg.content));
            }
        }

        let instruction = format!(
            r#"Analyze this round of debate and provide your assessment.

Your response MUST be in the following JSON format:
```json
{{
    "consensus_score": 0.7,
    "should_continue": true,
    "reasoning": "Why the debate should continue or stop",
    "key_disagreements": ["Point 1", "Point 2"],
    "key_agreements": ["Point 1"],
    "quality_score": 0.8
}}
```

- consensus_score: 0.0 (complete disagreement) to 1.0 (full consensus)
- should_continue: false if consensus >= {} or repetitive
- quality_score: 0.0 to 1.0 based on argument quality

Ensure the JSON is valid."#,
            self.consensus_threshold
        );

        vec![Message::user(prompt), Message::user(instruction)]
    }
}

#[async_trait]
impl Agent for ModeratorAgent {
    fn agent_id(&self) -> &str {
        &self.core.agent_id
    }

    fn role(&self) -> AgentRole {
        AgentRole::Moderator
    }

    fn system_prompt(&self) -> String {
        self.core.system_prompt_or(MODERATOR_SYSTEM_PROMPT)
    }

    async fn act(&self, state: &DebateState) -> AgentResult<DebateMessage> {
        let messages = self.build_prompt(state);
        let response = self
            .core
            .complete(messages, self.system_prompt())
            .await
            .map_err(|e| DebateError::provider(&self.core.agent_id, e))?;

        tracing::debug!(
            agent_id = %self.core.agent_id,
            round = state.current_round,
            "Moderator assessed round"
        );

        Ok(self.core.wrap_response(AgentRole::Moderator, state, response))
    }
}
