//! Turn-taking strategies for debate rounds.
//!
//! A [`TurnStrategy`] decides how debaters take turns within a round. Two
//! behaviors are supported and deliberately kept selectable:
//!
//! - [`BlindConcurrent`]: every debater sees the same snapshot (prior
//!   rounds only) and all calls run in parallel.
//! - [`SequentialWithVisibility`]: debaters speak in roster order and each
//!   sees the same-round arguments of those before them.
//!
//! Both produce exactly one message per debater, tagged with the current
//! round.

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::agents::{Agent, DebaterAgent};
use crate::error::AgentResult;
use crate::state::{DebateMessage, DebateState};

/// Pluggable policy for how debaters take turns within a round.
#[async_trait]
pub trait TurnStrategy: Send + Sync {
    /// Strategy name, for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Run one round over the full roster, returning exactly
    /// `debaters.len()` messages in emission order.
    async fn execute_round(
        &self,
        debaters: &[DebaterAgent],
        state: &DebateState,
    ) -> AgentResult<Vec<DebateMessage>>;

    /// Whether another round should run after this one. Strategies only
    /// consider the round bound; the moderator can stop earlier.
    fn should_continue(&self, state: &DebateState, round_messages: &[DebateMessage]) -> bool;
}

/// All debaters receive the same prior-rounds snapshot and are invoked in
/// parallel; nobody sees same-round output from anyone else.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlindConcurrent;

#[async_trait]
impl TurnStrategy for BlindConcurrent {
    fn name(&self) -> &'static str {
        "blind_concurrent"
    }

    async fn execute_round(
        &self,
        debaters: &[DebaterAgent],
        state: &DebateState,
    ) -> AgentResult<Vec<DebateMessage>> {
        // No ordering dependency between calls: same immutable snapshot in,
        // independently owned messages out, merged after all settle.
        let messages = try_join_all(debaters.iter().map(|debater| debater.act(state))).await?;
        Ok(messages)
    }

    fn should_continue(&self, state: &DebateState, _round_messages: &[DebateMessage]) -> bool {
        state.current_round < state.max_rounds
    }
}

/// Debaters speak one at a time in roster order; each sees the same-round
/// arguments of everyone before them via a local transcript copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialWithVisibility;

#[async_trait]
impl TurnStrategy for SequentialWithVisibility {
    fn name(&self) -> &'static str {
        "sequential_with_visibility"
    }

    async fn execute_round(
        &self,
        debaters: &[DebaterAgent],
        state: &DebateState,
    ) -> AgentResult<Vec<DebateMessage>> {
        let mut local = state.clone();
        let mut messages = Vec::with_capacity(debaters.len());

        for debater in debaters {
            let message = debater.act(&local).await?;
            // Grow the local transcript so later debaters see this turn.
            // The shared state is only updated by the orchestrator once the
            // whole round has settled.
            local.messages.push(message.clone());
            messages.push(message);
        }

        Ok(messages)
    }

    fn should_continue(&self, state: &DebateState, _round_messages: &[DebateMessage]) -> bool {
        state.current_round < state.max_rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(BlindConcurrent.name(), "blind_concurrent");
        assert_eq!(
            SequentialWithVisibility.name(),
            "sequential_with_visibility"
        );
    }

    #[test]
    fn test_should_continue_respects_round_bound() {
        let mut state = DebateState::new("T", None, 3, 2);
        state.current_round = 2;
        assert!(BlindConcurrent.should_continue(&state, &[]));
        assert!(SequentialWithVisibility.should_continue(&state, &[]));

        state.current_round = 3;
        assert!(!BlindConcurrent.should_continue(&state, &[]));
        assert!(!SequentialWithVisibility.should_continue(&state, &[]));
    }
}
