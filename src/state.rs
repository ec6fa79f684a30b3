//! Debate state model.
//!
//! [`DebateState`] is the single mutable record threading through a run.
//! It has exactly one active mutator at any time: the orchestrator, between
//! phase steps. Agents receive immutable snapshots and return independently
//! owned messages that the orchestrator merges back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::JudgeVerdict;

/// Role an agent plays in the debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Produces argumentative content on the topic.
    Debater,
    /// Synthesizes all debate output into a final verdict.
    Judge,
    /// Scores consensus and decides whether to stop early.
    Moderator,
}

impl AgentRole {
    /// Lowercase wire name for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debater => "debater",
            Self::Judge => "judge",
            Self::Moderator => "moderator",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Orchestration phase of a debate run.
///
/// Strictly forward-moving except for the debate/moderate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Debate,
    Moderate,
    Judge,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Debate => "debate",
            Self::Moderate => "moderate",
            Self::Judge => "judge",
            Self::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

/// Per-call usage metadata attached to a message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Tokens in the prompt sent to the provider.
    pub input_tokens: u32,
    /// Tokens generated by the provider.
    pub output_tokens: u32,
    /// Cost of the call in USD.
    pub cost: f64,
    /// Latency of the call in milliseconds.
    pub latency_ms: f64,
}

impl MessageMetadata {
    /// Total tokens for the call.
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A single message in the debate transcript. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateMessage {
    /// Identifier of the agent that produced this message.
    pub agent_id: String,
    /// Role of the producing agent.
    pub agent_role: AgentRole,
    /// Provider name that served the call.
    pub provider: String,
    /// Model that generated the content.
    pub model: String,
    /// Generated content.
    pub content: String,
    /// Round the message belongs to.
    pub round: u32,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
    /// Token/cost/latency metadata from the producing call.
    pub metadata: MessageMetadata,
}

/// The single mutable record for one debate run.
///
/// Invariants maintained by the orchestrator:
/// - `0 <= current_round <= max_rounds`
/// - `messages` is append-only, ordered by non-decreasing round
/// - `total_tokens` / `total_cost` are monotonically non-decreasing
/// - verdict fields and `end_time` are written exactly once, together, at
///   the transition into [`Phase::Complete`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    /// The question or proposition under debate.
    pub topic: String,
    /// Optional background context for the topic.
    pub context: Option<String>,

    /// Maximum number of debate rounds.
    pub max_rounds: u32,
    /// Current round, 0 until the debate starts.
    pub current_round: u32,
    /// Number of debaters in the roster.
    pub debater_count: usize,

    /// Full transcript, append-only.
    pub messages: Vec<DebateMessage>,
    /// Current orchestration phase.
    pub phase: Phase,

    /// Whether another debate round should run. Written by the moderate phase.
    pub should_continue: bool,
    /// Whether the run stopped before `max_rounds` on consensus.
    pub early_consensus: bool,
    /// Latest moderator consensus score, in `[0, 1]`.
    pub consensus_score: f64,

    /// Structured verdict, set once at completion.
    pub judge_verdict: Option<JudgeVerdict>,
    /// Final answer text, set once at completion.
    pub final_answer: Option<String>,
    /// Judge confidence, set once at completion.
    pub confidence_score: Option<f64>,
    /// Valid minority positions acknowledged by the judge.
    pub dissenting_opinions: Vec<String>,

    /// Total tokens consumed across all successful agent calls.
    pub total_tokens: u64,
    /// Total cost in USD across all successful agent calls.
    pub total_cost: f64,

    /// When the run started.
    pub start_time: DateTime<Utc>,
    /// When the run completed. Set exactly once.
    pub end_time: Option<DateTime<Utc>>,
}

impl DebateState {
    /// Create an initial state in [`Phase::Init`].
    pub fn new(
        topic: impl Into<String>,
        context: Option<String>,
        max_rounds: u32,
        debater_count: usize,
    ) -> Self {
        Self {
            topic: topic.into(),
            context,
            max_rounds,
            current_round: 0,
            debater_count,
            messages: Vec::new(),
            phase: Phase::Init,
            should_continue: true,
            early_consensus: false,
            consensus_score: 0.0,
            judge_verdict: None,
            final_answer: None,
            confidence_score: None,
            dissenting_opinions: Vec::new(),
            total_tokens: 0,
            total_cost: 0.0,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    /// Append one message and accumulate its usage into the run totals.
    ///
    /// This is the only way messages enter the transcript, which keeps the
    /// cost totals equal to the sum of all per-message metadata.
    pub fn absorb_message(&mut self, message: DebateMessage) {
        self.total_tokens += u64::from(message.metadata.total_tokens());
        self.total_cost += message.metadata.cost;
        self.messages.push(message);
    }

    /// Merge a completed round's messages into the transcript, in emission
    /// order, accumulating usage totals.
    pub fn absorb_round(&mut self, messages: Vec<DebateMessage>) {
        for message in messages {
            self.absorb_message(message);
        }
    }

    /// Messages belonging to the given round.
    pub fn round_messages(&self, round: u32) -> impl Iterator<Item = &DebateMessage> {
        self.messages.iter().filter(move |m| m.round == round)
    }

    /// Debater-authored messages across all rounds.
    pub fn debater_messages(&self) -> impl Iterator<Item = &DebateMessage> {
        self.messages
            .iter()
            .filter(|m| m.agent_role == AgentRole::Debater)
    }

    /// Write the verdict fields, stamp `end_time` and move to
    /// [`Phase::Complete`]. All completion fields are set together here and
    /// nowhere else.
    pub fn complete_with_verdict(&mut self, verdict: JudgeVerdict) {
        self.final_answer = Some(verdict.verdict.clone());
        self.confidence_score = Some(verdict.confidence);
        self.dissenting_opinions = verdict.dissenting_points.clone();
        self.judge_verdict = Some(verdict);
        self.end_time = Some(Utc::now());
        self.phase = Phase::Complete;
    }
}
