//! Debater agent.

use std::sync::Arc;

use async_trait::async_trait;

use super::core::AgentCore;
use super::Agent;
use crate::error::{AgentResult, DebateError};
use crate::llm::{LlmProvider, Message};
use crate::state::{AgentRole, DebateMessage, DebateState};

const DEBATER_SYSTEM_PROMPT: &str = "\
You are a skilled debater participating in a multi-agent debate.
Your goal is to:
1. Present clear, well-reasoned arguments
2. Consider and respond to other participants' points
3. Acknowledge valid counterarguments while defending your position
4. Work toward finding the most accurate or optimal solution

Be concise but thorough. Support your arguments with reasoning and examples when helpful.
If you change your position based on compelling arguments, explain why.";

/// Agent that argues a topic over successive rounds, optionally from a
/// fixed perspective (e.g., "security", "performance").
pub struct DebaterAgent {
    core: AgentCore,
    perspective: Option<String>,
}

impl DebaterAgent {
    /// Create a debater with the default temperature (0.7).
    pub fn new(
        agent_id: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            core: AgentCore::new(agent_id, provider, model, 0.7),
            perspective: None,
        }
    }

    /// Set the fixed perspective this debater argues from.
    pub fn with_perspective(mut self, perspective: impl Into<String>) -> Self {
        self.perspective = Some(perspective.into());
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

    /// The perspective label, if configured.
    pub fn perspective(&self) -> Option<&str> {
        self.perspective.as_deref()
    }

    fn default_system_prompt(&self) -> String {
        let mut prompt = DEBATER_SYSTEM_PROMPT.to_string();
        if let Some(perspective) = &self.perspective {
            prompt.push_str(&format!(
                "\n\nYour specific perspective/focus: {perspective}\n\
                 Analyze the topic primarily through this lens while remaining open to other viewpoints."
            ));
        }
        prompt
    }

    /// Topic and context, full conversation history (own turns included),
    /// then a round-specific instruction.
    pub(crate) fn build_prompt(&self, state: &DebateState) -> Vec<Message> {
        let mut messages = Vec::new();

        let mut topic = format!("## Debate Topic\n{}", state.topic);
        if let Some(context) = &state.context {
            topic.push_str(&format!("\n\n## Context\n{context}"));
        }
        messages.push(Message::user(topic));

        let history = self.core.conversation_history(state, true);
        let history_empty = history.is_empty();
        messages.extend(history);

        let round = state.current_round;
        let max_rounds = state.max_rounds;
        let mut instruction = if round == 1 && history_empty {
            "Please present your initial position and arguments on this topic.".to_string()
        } else if round == max_rounds {
            format!(
                "This is the final round ({round}/{max_rounds}). \
                 Please provide your final, refined position considering all previous arguments."
            )
        } else {
            format!(
                "Round {round}/{max_rounds}. \
                 Review the other participants' arguments and respond with your analysis. \
                 You may refine, defend, or update your position."
            )
        };
        if let Some(perspective) = &self.perspective {
            instruction.push_str(&format!(
                "\n\nRemember to focus on the {perspective} perspective."
            ));
        }
        messages.push(Message::user(instruction));

        messages
    }
}

#[async_trait]
impl Agent for DebaterAgent {
    fn agent_id(&self) -> &str {
        &self.core.agent_id
    }

    fn role(&self) -> AgentRole {
        AgentRole::Debater
    }

    fn system_prompt(&self) -> String {
        self.core.system_prompt_or(&self.default_system_prompt())
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
            output_tokens = response.output_tokens,
            "Debater produced argument"
        );

        Ok(self.core.wrap_response(AgentRole::Debater, state, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{GenerationRequest, GenerationResponse};
    use crate::state::MessageMetadata;
    use chrono::Utc;

    struct NullProvider;

    #[async_trait]
    impl LlmProvider for NullProvider {
        fn name(&self) -> &str {
            "null"
        }

        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            Err(LlmError::EmptyResponse)
        }
    }

    fn debater(perspective: Option<&str>) -> DebaterAgent {
        let d = DebaterAgent::new("d1", Arc::new(NullProvider), "model");
        match perspective {
            Some(p) => d.with_perspective(p),
            None => d,
        }
    }

    fn state_at_round(round: u32, max_rounds: u32) -> DebateState {
        let mut state = DebateState::new("Should we rewrite it?", None, max_rounds, 1);
        state.current_round = round;
        state
    }

    #[test]
    fn test_initial_round_instruction() {
        let prompt = debater(None).build_prompt(&state_at_round(1, 3));
        let last = &prompt.last().expect("instruction present").content;
        assert!(last.contains("initial position"));
    }

    #[test]
    fn test_final_round_instruction() {
        let prompt = debater(None).build_prompt(&state_at_round(3, 3));
        let last = &prompt.last().expect("instruction present").content;
        assert!(last.contains("final round (3/3)"));
    }

    #[test]
    fn test_intermediate_round_instruction() {
        let mut state = state_at_round(2, 3);
        state.absorb_message(DebateMessage {
            agent_id: "d2".to_string(),
            agent_role: AgentRole::Debater,
            provider: "null".to_string(),
            model: "m".to_string(),
            content: "earlier argument".to_string(),
            round: 1,
            timestamp: Utc::now(),
            metadata: MessageMetadata::default(),
        });

        let prompt = debater(None).build_prompt(&state);
        let last = &prompt.last().expect("instruction present").content;
        assert!(last.contains("Round 2/3"));
        assert!(last.contains("refine, defend, or update"));
    }

    #[test]
    fn test_perspective_appended_to_prompt_and_instruction() {
        let d = debater(Some("security"));
        assert!(d.system_prompt().contains("security"));

        let prompt = d.build_prompt(&state_at_round(1, 3));
        let last = &prompt.last().expect("instruction present").content;
        assert!(last.contains("security perspective"));
    }

    #[test]
    fn test_topic_and_context_lead_the_prompt() {
        let mut state = state_at_round(1, 3);
        state.context = Some("Background details".to_string());

        let prompt = debater(None).build_prompt(&state);
        assert!(prompt[0].content.contains("## Debate Topic"));
        assert!(prompt[0].content.contains("Background details"));
    }
}
