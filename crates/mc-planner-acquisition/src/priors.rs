// crates/mc-planner-acquisition/src/priors.rs
// ============================================================================
// Module: Prior Store
// Description: Learned per-(item, strategy, contextToken) success statistics.
// Dependencies: crate::types
// ============================================================================

//! ## Overview
//! `PriorStore` is owned exclusively by one acquisition-solver instance — a
//! concrete struct, not a trait object, since this store has no pluggable
//! backend implementation.

use std::collections::HashMap;

use crate::types::AcquisitionStrategy;

/// Key a prior is tracked under: `(item, strategy, contextToken)`.
/// `context_token` is `None` when a candidate does not depend on one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriorKey {
    item: String,
    strategy: AcquisitionStrategy,
    context_token: Option<String>,
}

/// Learned statistics for one prior key.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriorRecord {
    success_rate: f64,
    sample_count: u32,
}

/// The neutral prior assigned to a key with no observed episodes: an
/// uninformative midpoint, not an optimistic or pessimistic assumption.
const NEUTRAL_SUCCESS_RATE: f64 = 0.5;

/// Outcome of [`PriorStore::report_episode_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeReportOutcome {
    /// The report was applied to the prior store.
    Applied,
    /// The report carried no `plan_id` and was skipped without updating
    /// anything. This is a value to inspect, never a panic.
    SkippedMissingPlanId,
}

/// Tracks `{successRate, sampleCount}` per `(item, strategy, contextToken)`.
#[derive(Debug, Clone, Default)]
pub struct PriorStore {
    records: HashMap<PriorKey, PriorRecord>,
}

impl PriorStore {
    /// Creates an empty prior store.
    #[must_use]
    pub fn new() -> Self {
        Self { records: HashMap::new() }
    }

    /// Returns `(successRate, sampleCount)` for a key, or the neutral prior
    /// when no episodes have been observed yet.
    #[must_use]
    pub fn get(&self, item: &str, strategy: AcquisitionStrategy, context_token: Option<&str>) -> (f64, u32) {
        let key = PriorKey {
            item: item.to_string(),
            strategy,
            context_token: context_token.map(ToString::to_string),
        };
        self.records
            .get(&key)
            .map_or((NEUTRAL_SUCCESS_RATE, 0), |record| (record.success_rate, record.sample_count))
    }

    /// Records the outcome of one dispatched episode, updating the prior's
    /// running success rate. Missing `plan_id` is skipped, never panics.
    pub fn report_episode_result(
        &mut self,
        item: &str,
        strategy: AcquisitionStrategy,
        context_token: Option<&str>,
        success: bool,
        plan_id: Option<&str>,
    ) -> EpisodeReportOutcome {
        if plan_id.is_none() {
            return EpisodeReportOutcome::SkippedMissingPlanId;
        }

        let key = PriorKey {
            item: item.to_string(),
            strategy,
            context_token: context_token.map(ToString::to_string),
        };
        let entry = self.records.entry(key).or_insert(PriorRecord { success_rate: NEUTRAL_SUCCESS_RATE, sample_count: 0 });
        let observed = if success { 1.0 } else { 0.0 };
        let total = f64::from(entry.sample_count);
        entry.success_rate = entry.success_rate.mul_add(total, observed) / (total + 1.0);
        entry.sample_count += 1;

        EpisodeReportOutcome::Applied
    }
}
