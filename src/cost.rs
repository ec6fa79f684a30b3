//! Cost accounting for debate runs.
//!
//! The ledger is append-only: one [`CostEntry`] per *successful* agent
//! call, written after the call settles. A call that fails contributes no
//! entry. [`CostSummary`] is recomputed on demand from the entries and is
//! never a second source of truth.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::DebateMessage;

/// A single immutable cost record for one completed agent call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    /// Provider that served the call.
    pub provider: String,
    /// Model that generated the response.
    pub model: String,
    /// Tokens in the prompt.
    pub input_tokens: u32,
    /// Tokens generated.
    pub output_tokens: u32,
    /// Cost of the call in USD.
    pub cost: f64,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Aggregated view over a ledger's entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSummary {
    /// Total cost in USD.
    pub total_cost: f64,
    /// Total input tokens.
    pub total_input_tokens: u64,
    /// Total output tokens.
    pub total_output_tokens: u64,
    /// Total tokens, input plus output.
    pub total_tokens: u64,
    /// Cost grouped by provider.
    pub by_provider: BTreeMap<String, f64>,
    /// Cost grouped by model.
    pub by_model: BTreeMap<String, f64>,
    /// The entries the summary was computed from.
    pub entries: Vec<CostEntry>,
}

impl std::fmt::Display for CostSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total Cost: ${:.4}", self.total_cost)?;
        writeln!(f, "Total Tokens: {}", self.total_tokens)?;
        writeln!(f, "  Input: {}", self.total_input_tokens)?;
        writeln!(f, "  Output: {}", self.total_output_tokens)?;
        writeln!(f)?;
        writeln!(f, "By Provider:")?;
        for (provider, cost) in &self.by_provider {
            writeln!(f, "  {provider}: ${cost:.4}")?;
        }
        writeln!(f)?;
        writeln!(f, "By Model:")?;
        for (model, cost) in &self.by_model {
            writeln!(f, "  {model}: ${cost:.4}")?;
        }
        Ok(())
    }
}

/// Append-only ledger of per-call costs for one debate run.
#[derive(Debug, Default)]
pub struct CostLedger {
    entries: Vec<CostEntry>,
}

impl CostLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed call.
    pub fn record(
        &mut self,
        provider: impl Into<String>,
        model: impl Into<String>,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
    ) {
        let entry = CostEntry {
            provider: provider.into(),
            model: model.into(),
            input_tokens,
            output_tokens,
            cost,
            timestamp: Utc::now(),
        };
        tracing::debug!(
            provider = %entry.provider,
            model = %entry.model,
            input_tokens,
            output_tokens,
            cost,
            "Recorded agent call cost"
        );
        self.entries.push(entry);
    }

    /// Record the usage metadata carried by a transcript message.
    pub fn record_message(&mut self, message: &DebateMessage) {
        self.record(
            message.provider.clone(),
            message.model.clone(),
            message.metadata.input_tokens,
            message.metadata.output_tokens,
            message.metadata.cost,
        );
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no calls have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total cost so far in USD.
    pub fn total_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.cost).sum()
    }

    /// Total tokens used so far.
    pub fn total_tokens(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.input_tokens) + u64::from(e.output_tokens))
            .sum()
    }

    /// Compute a summary over all recorded entries.
    pub fn summary(&self) -> CostSummary {
        let total_cost = self.total_cost();
        let total_input_tokens: u64 = self.entries.iter().map(|e| u64::from(e.input_tokens)).sum();
        let total_output_tokens: u64 = self
            .entries
            .iter()
            .map(|e| u64::from(e.output_tokens))
            .sum();

        let mut by_provider: BTreeMap<String, f64> = BTreeMap::new();
        let mut by_model: BTreeMap<String, f64> = BTreeMap::new();
        for entry in &self.entries {
            *by_provider.entry(entry.provider.clone()).or_default() += entry.cost;
            *by_model.entry(entry.model.clone()).or_default() += entry.cost;
        }

        CostSummary {
            total_cost,
            total_input_tokens,
            total_output_tokens,
            total_tokens: total_input_tokens + total_output_tokens,
            by_provider,
            by_model,
            entries: self.entries.clone(),
        }
    }

    /// Clear all recorded entries.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ledger() {
        let ledger = CostLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_cost(), 0.0);
        assert_eq!(ledger.total_tokens(), 0);
    }

    #[test]
    fn test_record_and_totals() {
        let mut ledger = CostLedger::new();
        ledger.record("anthropic", "claude-sonnet", 1000, 500, 0.01);
        ledger.record("openai", "gpt-4o", 2000, 1000, 0.02);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_tokens(), 4500);
        assert!((ledger.total_cost() - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_summary_groups_by_provider_and_model() {
        let mut ledger = CostLedger::new();
        ledger.record("anthropic", "claude-sonnet", 100, 50, 0.01);
        ledger.record("anthropic", "claude-haiku", 100, 50, 0.002);
        ledger.record("openai", "gpt-4o", 100, 50, 0.02);

        let summary = ledger.summary();
        assert_eq!(summary.total_tokens, 450);
        assert!((summary.by_provider["anthropic"] - 0.012).abs() < 1e-9);
        assert!((summary.by_provider["openai"] - 0.02).abs() < 1e-9);
        assert_eq!(summary.by_model.len(), 3);
        assert_eq!(summary.entries.len(), 3);
    }

    #[test]
    fn test_summary_display() {
        let mut ledger = CostLedger::new();
        ledger.record("anthropic", "claude-sonnet", 1000, 500, 0.0123);

        let rendered = ledger.summary().to_string();
        assert!(rendered.contains("Total Cost: $0.0123"));
        assert!(rendered.contains("Total Tokens: 1500"));
        assert!(rendered.contains("anthropic"));
        assert!(rendered.contains("claude-sonnet"));
    }

    #[test]
    fn test_reset() {
        let mut ledger = CostLedger::new();
        ledger.record("p", "m", 1, 1, 0.1);
        ledger.reset();
        assert!(ledger.is_empty());
    }
}
