//! Judge agent and verdict parsing.
//!
//! The judge is invoked exactly once, at the judge phase, and must always
//! yield *some* verdict: a structured response is parsed strictly, and any
//! malformed response degrades to a low-confidence raw verdict instead of
//! an error. This is what guarantees every run terminates in a verdict.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::core::AgentCore;
use super::Agent;
use crate::error::{AgentResult, DebateError};
use crate::llm::{LlmProvider, Message};
use crate::state::{AgentRole, DebateMessage, DebateState};
use crate::utils::json::parse_json_object;

const JUDGE_SYSTEM_PROMPT: &str = "\
You are an impartial judge evaluating a multi-agent debate.
Your responsibilities:
1. Carefully analyze all arguments presented by each debater
2. Evaluate the strength of reasoning, evidence, and logic
3. Identify points of agreement and disagreement
4. Render a fair verdict based on the quality of arguments

You must be objective and not favor any particular debater.
Consider the validity of arguments, not just their persuasiveness.

When rendering your verdict, provide:
- A clear final answer or decision
- Confidence score (0.0 to 1.0)
- Key reasoning that led to your decision
- Acknowledgment of valid dissenting points";

const VERDICT_INSTRUCTION: &str = r#"Please evaluate this debate and provide your verdict.

Your response MUST be in the following JSON format:
```json
{
    "verdict": "Your final answer or decision",
    "confidence": 0.85,
    "reasoning": "Key points that led to your decision",
    "consensus_points": ["Point 1 all debaters agreed on", "Point 2"],
    "dissenting_points": ["Valid point from minority position"],
    "recommendations": "Any additional recommendations or insights"
}
```

Ensure the JSON is valid and complete."#;

/// Structured verdict synthesized by the judge.
///
/// All fields default, so a partially structured response still parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeVerdict {
    /// The final answer or decision.
    #[serde(default)]
    pub verdict: String,
    /// Judge confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Key reasoning behind the decision.
    #[serde(default)]
    pub reasoning: String,
    /// Points all debaters agreed on.
    #[serde(default)]
    pub consensus_points: Vec<String>,
    /// Valid minority positions.
    #[serde(default)]
    pub dissenting_points: Vec<String>,
    /// Additional recommendations or insights.
    #[serde(default)]
    pub recommendations: String,
}

fn default_confidence() -> f64 {
    0.5
}

/// Parse a verdict from raw response content.
///
/// Strictly parses the first-`{`-to-last-`}` span; on any failure, falls
/// back to a degraded verdict carrying the raw content at confidence 0.5.
/// Never fails.
pub fn parse_verdict(content: &str) -> JudgeVerdict {
    if let Some(verdict) = parse_json_object::<JudgeVerdict>(content) {
        return verdict;
    }

    tracing::warn!("Judge response had no parseable verdict, using raw content fallback");
    JudgeVerdict {
        verdict: content.to_string(),
        confidence: 0.5,
        reasoning: "Unable to parse structured verdict".to_string(),
        consensus_points: Vec::new(),
        dissenting_points: Vec::new(),
        recommendations: String::new(),
    }
}

/// Agent that synthesizes the debate into a final verdict.
pub struct JudgeAgent {
    core: AgentCore,
}

impl JudgeAgent {
    /// Create a judge with a low default temperature (0.3) for consistency.
    pub fn new(
        agent_id: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            core: AgentCore::new(agent_id, provider, model, 0.3),
        }
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

    /// Topic/context plus the debater-only transcript, then the structured
    /// verdict instruction.
    pub(crate) fn build_prompt(&self, state: &DebateState) -> Vec<Message> {
        let mut prompt = format!("## Debate Topic\n{}", state.topic);
        if let Some(context) = &state.context {
            prompt.push_str(&format!("\n\n## Context\n{context}"));
        }

        prompt.push_str("\n\n## Debate Transcript\n");
        for msg in state.debater_messages() {
            prompt.push_str(&format!(
                "\n### {} (Round {})\n{}\n",
                msg.agent_id, msg.round, msg.content
            ));
        }

        vec![Message::user(prompt), Message::user(VERDICT_INSTRUCTION)]
    }
}

#[async_trait]
impl Agent for JudgeAgent {
    fn agent_id(&self) -> &str {
        &self.core.agent_id
    }

    fn role(&self) -> AgentRole {
        AgentRole::Judge
    }

    fn system_prompt(&self) -> String {
        self.core.system_prompt_or(JUDGE_SYSTEM_PROMPT)
    }

    async fn act(&self, state: &DebateState) -> AgentResult<DebateMessage> {
        let messages = self.build_prompt(state);
        let response = self
            .core
            .complete(messages, self.system_prompt())
            .await
            .map_err(|e| DebateError::provider(&self.core.agent_id, e))?;

        tracing::info!(
            agent_id = %self.core.agent_id,
            round = state.current_round,
            "Judge rendered verdict"
        );

        Ok(self.core.wrap_response(AgentRole::Judge, state, response))
    }
}
