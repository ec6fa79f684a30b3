//! Debate agents: debaters, an optional moderator, and a terminal judge.
//!
//! All three roles implement the [`Agent`] trait and share an [`AgentCore`]
//! by composition for identity, provider binding, conversation-history
//! rendering and response wrapping.

pub mod core;
pub mod debater;
pub mod judge;
pub mod moderator;

use async_trait::async_trait;

pub use self::core::AgentCore;
pub use debater::DebaterAgent;
pub use judge::{parse_verdict, JudgeAgent, JudgeVerdict};
pub use moderator::{parse_moderation, ModerationAssessment, ModeratorAgent};

use crate::error::AgentResult;
use crate::state::{AgentRole, DebateMessage, DebateState};

/// Capability contract for every debate participant.
///
/// Agents are stateless across calls apart from their configuration: `act`
/// receives an immutable state snapshot and returns an independently owned
/// message. The only suspension point is the provider call inside `act`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique identifier for this agent within a run.
    fn agent_id(&self) -> &str;

    /// The agent's fixed role.
    fn role(&self) -> AgentRole;

    /// Effective system prompt: the configured override if supplied,
    /// otherwise the role-specific default.
    fn system_prompt(&self) -> String;

    /// Produce this agent's contribution for the current state.
    ///
    /// Fails with [`crate::error::DebateError::Provider`] when the backend
    /// call fails; that failure is never swallowed here.
    async fn act(&self, state: &DebateState) -> AgentResult<DebateMessage>;
}
