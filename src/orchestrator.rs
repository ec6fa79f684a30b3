//! Debate orchestration state machine.
//!
//! The orchestrator owns the [`DebateState`] for one run and sequences the
//! fixed phase graph `init → debate → moderate → {debate|judge} → complete`.
//! It invokes the configured turn-taking strategy for each debate round,
//! runs the optional moderator after every round, and always ends with a
//! single judge invocation that produces a verdict.
//!
//! The state has exactly one mutator: this orchestrator, between phase
//! steps. Agents receive immutable snapshots and their outputs are merged
//! back through the named [`DebateState::absorb_round`] /
//! [`DebateState::absorb_message`] steps after each call settles.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::agents::{
    parse_moderation, parse_verdict, Agent, DebaterAgent, JudgeAgent, JudgeVerdict, ModeratorAgent,
};
use crate::cost::{CostLedger, CostSummary};
use crate::error::{AgentResult, DebateError};
use crate::state::{DebateState, Phase};
use crate::strategy::{SequentialWithVisibility, TurnStrategy};

// ============================================================================
// Roster
// ============================================================================

/// The agents participating in one debate.
pub struct DebateRoster {
    /// Debaters, invoked every round in roster order.
    pub debaters: Vec<DebaterAgent>,
    /// Judge, invoked exactly once at the end.
    pub judge: JudgeAgent,
    /// Optional moderator, invoked after every round.
    pub moderator: Option<ModeratorAgent>,
}

impl DebateRoster {
    /// Create a roster without a moderator.
    pub fn new(debaters: Vec<DebaterAgent>, judge: JudgeAgent) -> Self {
        Self {
            debaters,
            judge,
            moderator: None,
        }
    }

    /// Attach a moderator for consensus-based early stopping.
    pub fn with_moderator(mut self, moderator: ModeratorAgent) -> Self {
        self.moderator = Some(moderator);
        self
    }
}

// ============================================================================
// Events
// ============================================================================

/// Events emitted during a run, for observers attached via
/// [`DebateOrchestratorBuilder::event_sink`]. Delivery is best-effort; a
/// dropped receiver never affects the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DebateEvent {
    /// The run has started.
    DebateStarted {
        debate_id: String,
        topic: String,
        debater_count: usize,
        max_rounds: u32,
        timestamp: DateTime<Utc>,
    },
    /// A debate round has started.
    RoundStarted { round: u32, timestamp: DateTime<Utc> },
    /// A debate round has completed with all debater messages merged.
    RoundCompleted {
        round: u32,
        message_count: usize,
        timestamp: DateTime<Utc>,
    },
    /// The moderator assessed the round.
    ConsensusCheck {
        round: u32,
        consensus_score: f64,
        stop_early: bool,
        timestamp: DateTime<Utc>,
    },
    /// The run has completed with a verdict.
    DebateCompleted {
        debate_id: String,
        early_consensus: bool,
        confidence: f64,
        total_cost: f64,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl DebateEvent {
    fn debate_started(debate_id: &Uuid, state: &DebateState) -> Self {
        Self::DebateStarted {
            debate_id: debate_id.to_string(),
            topic: state.topic.clone(),
            debater_count: state.debater_count,
            max_rounds: state.max_rounds,
            timestamp: Utc::now(),
        }
    }

    fn round_started(round: u32) -> Self {
        Self::RoundStarted {
            round,
            timestamp: Utc::now(),
        }
    }

    fn round_completed(round: u32, message_count: usize) -> Self {
        Self::RoundCompleted {
            round,
            message_count,
            timestamp: Utc::now(),
        }
    }

    fn consensus_check(round: u32, consensus_score: f64, stop_early: bool) -> Self {
        Self::ConsensusCheck {
            round,
            consensus_score,
            stop_early,
            timestamp: Utc::now(),
        }
    }

    fn debate_completed(
        debate_id: &Uuid,
        state: &DebateState,
        total_cost: f64,
        duration_ms: u64,
    ) -> Self {
        Self::DebateCompleted {
            debate_id: debate_id.to_string(),
            early_consensus: state.early_consensus,
            confidence: state.confidence_score.unwrap_or(0.0),
            total_cost,
            duration_ms,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of a completed debate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Unique identifier for this run.
    pub debate_id: String,
    /// The judge's final answer.
    pub verdict: String,
    /// Judge confidence in `[0, 1]`.
    pub confidence: f64,
    /// Key reasoning behind the verdict.
    pub reasoning: String,
    /// Points all debaters agreed on.
    pub consensus_points: Vec<String>,
    /// Valid minority positions.
    pub dissenting_opinions: Vec<String>,
    /// Additional recommendations from the judge.
    pub recommendations: String,
    /// Per-provider/per-model cost aggregation for the run.
    pub cost_summary: CostSummary,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// The complete final state, including the full transcript.
    pub final_state: DebateState,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives one or more debate runs over a fixed roster.
pub struct DebateOrchestrator {
    roster: DebateRoster,
    max_rounds: u32,
    strategy: Box<dyn TurnStrategy>,
    event_tx: Option<mpsc::Sender<DebateEvent>>,
}

impl DebateOrchestrator {
    /// Create an orchestrator with the default strategy
    /// ([`SequentialWithVisibility`]) and no event sink.
    ///
    /// Fails with [`DebateError::Configuration`] when `max_rounds` is zero;
    /// invalid settings are rejected here, never mid-run.
    pub fn new(roster: DebateRoster, max_rounds: u32) -> AgentResult<Self> {
        Self::builder().roster(roster).max_rounds(max_rounds).build()
    }

    /// Create a builder for full configuration.
    pub fn builder() -> DebateOrchestratorBuilder {
        DebateOrchestratorBuilder::new()
    }

    /// The configured maximum number of rounds.
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// The configured strategy name.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run a full debate on the given topic.
    ///
    /// Always terminates in a verdict unless a provider call fails, in
    /// which case the error is surfaced and no partial verdict is
    /// fabricated.
    pub async fn run(
        &self,
        topic: impl Into<String>,
        context: Option<String>,
    ) -> AgentResult<DebateOutcome> {
        let debate_id = Uuid::new_v4();
        let started = Instant::now();
        let mut ledger = CostLedger::new();
        let mut state = DebateState::new(topic, context, self.max_rounds, self.roster.debaters.len());

        tracing::info!(
            debate_id = %debate_id,
            topic = %state.topic,
            debaters = state.debater_count,
            max_rounds = state.max_rounds,
            strategy = self.strategy.name(),
            moderated = self.roster.moderator.is_some(),
            "Debate started"
        );
        self.emit(DebateEvent::debate_started(&debate_id, &state)).await;

        // init → debate
        state.phase = Phase::Debate;
        state.current_round = 1;
        state.start_time = Utc::now();

        // debate ↔ moderate cycle, exited into the judge phase
        loop {
            match state.phase {
                Phase::Debate => self.debate_step(&mut state, &mut ledger).await?,
                Phase::Moderate => self.moderate_step(&mut state, &mut ledger).await?,
                _ => break,
            }
        }

        let verdict = self.judge_step(&mut state, &mut ledger).await?;

        let duration_ms = started.elapsed().as_millis() as u64;
        let cost_summary = ledger.summary();

        tracing::info!(
            debate_id = %debate_id,
            rounds = state.current_round,
            early_consensus = state.early_consensus,
            confidence = verdict.confidence,
            total_cost = cost_summary.total_cost,
            duration_ms,
            "Debate completed"
        );
        self.emit(DebateEvent::debate_completed(
            &debate_id,
            &state,
            cost_summary.total_cost,
            duration_ms,
        ))
        .await;

        Ok(DebateOutcome {
            debate_id: debate_id.to_string(),
            verdict: verdict.verdict,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            consensus_points: verdict.consensus_points,
            dissenting_opinions: verdict.dissenting_points,
            recommendations: verdict.recommendations,
            cost_summary,
            duration_ms,
            final_state: state,
        })
    }

    /// One debate round: run the strategy over the roster, then merge all
    /// settled messages and their costs at once.
    async fn debate_step(
        &self,
        state: &mut DebateState,
        ledger: &mut CostLedger,
    ) -> AgentResult<()> {
        let round = state.current_round;
        self.emit(DebateEvent::round_started(round)).await;
        tracing::debug!(round, strategy = self.strategy.name(), "Round started");

        let messages = self
            .strategy
            .execute_round(&self.roster.debaters, state)
            .await?;

        for message in &messages {
            ledger.record_message(message);
        }
        let message_count = messages.len();
        state.absorb_round(messages);

        self.emit(DebateEvent::round_completed(round, message_count))
            .await;
        state.phase = Phase::Moderate;
        Ok(())
    }

    /// Moderation: decide whether to run another round or hand over to the
    /// judge. Without a moderator this is a pure round-count check.
    async fn moderate_step(
        &self,
        state: &mut DebateState,
        ledger: &mut CostLedger,
    ) -> AgentResult<()> {
        let current = state.current_round;

        let Some(moderator) = &self.roster.moderator else {
            let round_messages: Vec<_> = state.round_messages(current).cloned().collect();
            let keep_going = self.strategy.should_continue(state, &round_messages);
            state.should_continue = keep_going;
            if keep_going {
                state.current_round = current + 1;
                state.phase = Phase::Debate;
            } else {
                state.phase = Phase::Judge;
            }
            return Ok(());
        };

        let message = moderator.act(state).await?;
        let assessment = parse_moderation(&message.content);
        ledger.record_message(&message);
        state.absorb_message(message);

        let stop_early = moderator.should_stop_early(&assessment);
        state.consensus_score = assessment.consensus_score;

        tracing::debug!(
            round = current,
            consensus_score = assessment.consensus_score,
            stop_early,
            "Consensus check"
        );
        self.emit(DebateEvent::consensus_check(
            current,
            assessment.consensus_score,
            stop_early,
        ))
        .await;

        if stop_early || current >= state.max_rounds {
            state.early_consensus = stop_early && current < state.max_rounds;
            state.should_continue = false;
            state.phase = Phase::Judge;
        } else {
            state.should_continue = true;
            state.current_round = current + 1;
            state.phase = Phase::Debate;
        }
        Ok(())
    }

    /// Terminal judge invocation: parse (or degrade) the verdict, merge the
    /// judge message, and complete the state.
    async fn judge_step(
        &self,
        state: &mut DebateState,
        ledger: &mut CostLedger,
    ) -> AgentResult<JudgeVerdict> {
        let message = self.roster.judge.act(state).await?;
        let verdict = parse_verdict(&message.content);

        ledger.record_message(&message);
        state.absorb_message(message);
        state.complete_with_verdict(verdict.clone());
        Ok(verdict)
    }

    async fn emit(&self, event: DebateEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

/// Run a single debate with default orchestration settings.
///
/// Convenience wrapper over [`DebateOrchestrator`] for one-shot callers.
pub async fn debate(
    topic: impl Into<String>,
    context: Option<String>,
    roster: DebateRoster,
    max_rounds: u32,
) -> AgentResult<DebateOutcome> {
    DebateOrchestrator::new(roster, max_rounds)?
        .run(topic, context)
        .await
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`DebateOrchestrator`].
pub struct DebateOrchestratorBuilder {
    roster: Option<DebateRoster>,
    max_rounds: u32,
    strategy: Box<dyn TurnStrategy>,
    event_tx: Option<mpsc::Sender<DebateEvent>>,
}

impl DebateOrchestratorBuilder {
    /// Create a builder with three rounds and the sequential strategy.
    pub fn new() -> Self {
        Self {
            roster: None,
            max_rounds: 3,
            strategy: Box::new(SequentialWithVisibility),
            event_tx: None,
        }
    }

    /// Set the agent roster (required).
    pub fn roster(mut self, roster: DebateRoster) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Set the maximum number of debate rounds.
    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the turn-taking strategy.
    pub fn strategy(mut self, strategy: Box<dyn TurnStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attach a channel that receives [`DebateEvent`]s during runs.
    pub fn event_sink(mut self, tx: mpsc::Sender<DebateEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Build the orchestrator, validating the configuration.
    pub fn build(self) -> AgentResult<DebateOrchestrator> {
        let roster = self
            .roster
            .ok_or_else(|| DebateError::Configuration("roster is required".to_string()))?;
        if self.max_rounds == 0 {
            return Err(DebateError::Configuration(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if roster.debaters.is_empty() {
            // Permitted but degenerate: the judge will synthesize a verdict
            // from an empty transcript.
            tracing::warn!("Roster has no debaters; the judge will see an empty transcript");
        }

        Ok(DebateOrchestrator {
            roster,
            max_rounds: self.max_rounds,
            strategy: self.strategy,
            event_tx: self.event_tx,
        })
    }
}

impl Default for DebateOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
