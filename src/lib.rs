//! debate-forge: multi-agent debate orchestration for LLM agents.
//!
//! This library drives a bounded, auditable, cost-tracked debate between
//! several LLM-backed debater agents, an optional moderator that can stop
//! the debate early on consensus, and a terminal judge that always renders
//! a synthesized verdict with confidence and dissent information.
//!
//! The LLM backend itself is not implemented here; callers supply any type
//! implementing [`llm::LlmProvider`].

// Core modules
pub mod agents;
pub mod cost;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod state;
pub mod strategy;
pub mod utils;

// Re-export the types most callers need
pub use agents::{
    Agent, DebaterAgent, JudgeAgent, JudgeVerdict, ModerationAssessment, ModeratorAgent,
};
pub use cost::{CostEntry, CostLedger, CostSummary};
pub use error::{AgentResult, DebateError, LlmError};
pub use llm::{GenerationRequest, GenerationResponse, LlmProvider, Message};
pub use orchestrator::{
    debate, DebateEvent, DebateOrchestrator, DebateOrchestratorBuilder, DebateOutcome,
    DebateRoster,
};
pub use state::{AgentRole, DebateMessage, DebateState, Phase};
pub use strategy::{BlindConcurrent, SequentialWithVisibility, TurnStrategy};
