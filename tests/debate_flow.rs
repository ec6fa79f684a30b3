//! End-to-end debate flow tests over scripted providers.
//!
//! Every test drives the real orchestrator through full runs; only the
//! provider boundary is mocked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use debate_forge::{
    BlindConcurrent, DebateError, DebateOrchestrator, DebateRoster, DebaterAgent,
    GenerationRequest, GenerationResponse, JudgeAgent, LlmError, LlmProvider, ModeratorAgent,
    Phase,
};

/// Provider that replays a fixed script of responses (last one repeats) and
/// records every request it receives.
struct ScriptedProvider {
    name: &'static str,
    script: Vec<String>,
    cursor: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    fn new(name: &'static str, script: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: script.iter().map(|s| s.to_string()).collect(),
            cursor: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let content = self.script[index.min(self.script.len() - 1)].clone();
        Ok(GenerationResponse {
            content,
            input_tokens: 100,
            output_tokens: 50,
            cost: 0.001,
            latency_ms: 2.0,
        })
    }
}

/// Provider that always fails.
struct FailingProvider;

#[async_trait]
impl LlmProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        Err(LlmError::RateLimited("request quota exhausted".to_string()))
    }
}

const VERDICT_JSON: &str = r#"{
    "verdict": "The group converged on option B",
    "confidence": 0.9,
    "reasoning": "Stronger evidence",
    "consensus_points": ["Option B is feasible"],
    "dissenting_points": ["Cost remains a concern"],
    "recommendations": "Validate with a prototype"
}"#;

fn judge() -> (Arc<ScriptedProvider>, JudgeAgent) {
    let provider = ScriptedProvider::new("scripted", &[VERDICT_JSON]);
    let agent = JudgeAgent::new("judge", provider.clone(), "test-model");
    (provider, agent)
}

fn debaters(count: usize) -> Vec<DebaterAgent> {
    let provider = ScriptedProvider::new("scripted", &["I argue my position."]);
    (0..count)
        .map(|i| DebaterAgent::new(format!("d{}", i + 1), provider.clone(), "test-model"))
        .collect()
}

#[tokio::test]
async fn early_consensus_stops_before_round_limit() {
    let moderator = ModeratorAgent::new(
        "moderator",
        ScriptedProvider::new(
            "scripted",
            &[r#"{"consensus_score": 0.85, "should_continue": false, "reasoning": "Converged"}"#],
        ),
        "test-model",
    );
    let (judge_provider, judge) = judge();
    let roster = DebateRoster::new(debaters(2), judge).with_moderator(moderator);

    let orchestrator = DebateOrchestrator::new(roster, 5).unwrap();
    let outcome = orchestrator.run("Pick an option", None).await.unwrap();

    let state = &outcome.final_state;
    assert!(state.early_consensus);
    assert_eq!(state.current_round, 1);
    assert!((state.consensus_score - 0.85).abs() < 1e-9);
    assert!(!state.should_continue);
    // 2 debaters + 1 moderator + 1 judge
    assert_eq!(state.messages.len(), 4);
    assert_eq!(judge_provider.calls(), 1);
    assert_eq!(outcome.verdict, "The group converged on option B");
}

#[tokio::test]
async fn moderated_debate_runs_to_round_limit_without_consensus() {
    let moderator = ModeratorAgent::new(
        "moderator",
        ScriptedProvider::new(
            "scripted",
            &[r#"{"consensus_score": 0.3, "should_continue": true, "reasoning": "Still apart"}"#],
        ),
        "test-model",
    );
    let (_, judge) = judge();
    let roster = DebateRoster::new(debaters(2), judge).with_moderator(moderator);

    let outcome = DebateOrchestrator::new(roster, 2)
        .unwrap()
        .run("Pick an option", None)
        .await
        .unwrap();

    let state = &outcome.final_state;
    assert!(!state.early_consensus);
    assert_eq!(state.current_round, 2);
    assert_eq!(state.phase, Phase::Complete);
    // 2 rounds of (2 debaters + 1 moderator), then 1 judge
    assert_eq!(state.messages.len(), 7);
}

#[tokio::test]
async fn unmoderated_debate_always_runs_all_rounds() {
    let (_, judge) = judge();
    let roster = DebateRoster::new(debaters(3), judge);

    let outcome = DebateOrchestrator::new(roster, 2)
        .unwrap()
        .run("Pick an option", Some("Shared background".to_string()))
        .await
        .unwrap();

    let state = &outcome.final_state;
    assert_eq!(state.debater_messages().count(), 6);
    assert_eq!(state.messages.len(), 7);
    assert_eq!(state.current_round, 2);
    assert_eq!(state.consensus_score, 0.0);
    assert!(!state.early_consensus);
}

#[tokio::test]
async fn sequential_strategy_exposes_same_round_arguments() {
    let first = ScriptedProvider::new("scripted", &["ALPHA-POSITION"]);
    let second = ScriptedProvider::new("scripted", &["BETA-POSITION"]);
    let roster = DebateRoster::new(
        vec![
            DebaterAgent::new("d1", first, "test-model"),
            DebaterAgent::new("d2", second.clone(), "test-model"),
        ],
        judge().1,
    );

    // Sequential is the default strategy.
    DebateOrchestrator::new(roster, 1)
        .unwrap()
        .run("Pick an option", None)
        .await
        .unwrap();

    let requests = second.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0]
        .messages
        .iter()
        .any(|m| m.content.contains("ALPHA-POSITION")));
}

#[tokio::test]
async fn blind_concurrent_strategy_hides_same_round_arguments() {
    let first = ScriptedProvider::new("scripted", &["ALPHA-POSITION"]);
    let second = ScriptedProvider::new("scripted", &["BETA-POSITION"]);
    let roster = DebateRoster::new(
        vec![
            DebaterAgent::new("d1", first, "test-model"),
            DebaterAgent::new("d2", second.clone(), "test-model"),
        ],
        judge().1,
    );

    DebateOrchestrator::builder()
        .roster(roster)
        .max_rounds(1)
        .strategy(Box::new(BlindConcurrent))
        .build()
        .unwrap()
        .run("Pick an option", None)
        .await
        .unwrap();

    let requests = second.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0]
        .messages
        .iter()
        .any(|m| m.content.contains("ALPHA-POSITION")));
}

#[tokio::test]
async fn run_totals_equal_summed_message_metadata() {
    let moderator = ModeratorAgent::new(
        "moderator",
        ScriptedProvider::new("scripted", &[r#"{"consensus_score": 0.2}"#]),
        "test-model",
    );
    let (_, judge) = judge();
    let roster = DebateRoster::new(debaters(2), judge).with_moderator(moderator);

    let outcome = DebateOrchestrator::new(roster, 2)
        .unwrap()
        .run("Pick an option", None)
        .await
        .unwrap();

    // 2 rounds * (2 debaters + 1 moderator) + 1 judge = 7 calls, each
    // 100 input / 50 output tokens at $0.001.
    let calls = 7u64;
    let state = &outcome.final_state;
    assert_eq!(state.messages.len() as u64, calls);
    assert_eq!(state.total_tokens, calls * 150);
    assert!((state.total_cost - calls as f64 * 0.001).abs() < 1e-9);

    let summary = &outcome.cost_summary;
    assert_eq!(summary.entries.len() as u64, calls);
    assert_eq!(summary.total_tokens, state.total_tokens);
    assert!((summary.total_cost - state.total_cost).abs() < 1e-9);
    assert!((summary.by_provider["scripted"] - state.total_cost).abs() < 1e-9);
}

#[tokio::test]
async fn debater_failure_surfaces_with_agent_id() {
    let roster = DebateRoster::new(
        vec![
            DebaterAgent::new("d1", ScriptedProvider::new("scripted", &["fine"]), "test-model"),
            DebaterAgent::new("d2", Arc::new(FailingProvider), "test-model"),
        ],
        judge().1,
    );

    let result = DebateOrchestrator::new(roster, 3)
        .unwrap()
        .run("Pick an option", None)
        .await;

    match result {
        Err(DebateError::Provider { agent_id, .. }) => assert_eq!(agent_id, "d2"),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_verdict_degrades_to_raw_content() {
    let raw = "After much thought, option B wins. No JSON here.";
    let judge = JudgeAgent::new("judge", ScriptedProvider::new("scripted", &[raw]), "test-model");
    let roster = DebateRoster::new(debaters(2), judge);

    let outcome = DebateOrchestrator::new(roster, 1)
        .unwrap()
        .run("Pick an option", None)
        .await
        .unwrap();

    assert_eq!(outcome.verdict, raw);
    assert!((outcome.confidence - 0.5).abs() < 1e-9);
    assert_eq!(outcome.reasoning, "Unable to parse structured verdict");
    assert_eq!(outcome.final_state.final_answer.as_deref(), Some(raw));
}
