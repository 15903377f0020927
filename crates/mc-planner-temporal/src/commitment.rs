// crates/mc-planner-temporal/src/commitment.rs
// ============================================================================
// Module: P13 Commitment Planner
// Description: Reversibility-tagged commitment tracking and option-value
//              accounting.
// Dependencies: mc-planner-core::canon
// ============================================================================

//! ## Overview
//! Every committable operator carries a reversibility tag and a rollback
//! cost. Committing narrows the option set; this module tracks that
//! narrowing as a monotonic counter and a deduplicated, sorted block list,
//! and prices commitment against the option value it destroys.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// Upper bound on tracked option value.
pub const OPTION_VALUE_MAX: u64 = 10;

/// How reversible a commitment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversibilityTag {
    /// No cost to undo.
    FullyReversible,
    /// Undoing costs `rollback_cost`.
    CostlyReversible,
    /// Cannot be undone.
    Irreversible,
}

/// A committable operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitOperator {
    /// Operator identifier.
    pub id: String,
    /// This operator's reversibility.
    pub reversibility: ReversibilityTag,
    /// Cost to roll this operator back, in `[0, +inf)`. Ignored for
    /// [`ReversibilityTag::FullyReversible`].
    pub rollback_cost: f64,
    /// Ids of operators this one blocks once committed.
    pub blocks: Vec<String>,
}

/// The verification state a commitment decision is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationState {
    /// Confidence in the precondition holding, in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Confidence required to permit commitment.
    pub required_confidence: f64,
}

/// Accumulated commitment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentState {
    /// Operator ids currently blocked by a committed operator, sorted and
    /// deduplicated.
    pub blocked: Vec<String>,
    /// Number of commitments made so far. Monotonic non-decreasing.
    pub committed_count: u64,
    /// Current option value, seeded from the available-option count and
    /// eroded by commitment.
    pub option_value: u64,
}

impl CommitmentState {
    /// Builds an initial commitment state for `available_options` choices:
    /// `option_value = min(available_options * 2, OPTION_VALUE_MAX)`.
    #[must_use]
    pub fn initial(available_options: u64) -> Self {
        Self { blocked: Vec::new(), committed_count: 0, option_value: available_options.saturating_mul(2).min(OPTION_VALUE_MAX) }
    }
}

/// Whether an operator may be committed to right now.
#[must_use]
pub fn can_commit(op: &CommitOperator, verification: VerificationState, commit_state: &CommitmentState) -> bool {
    verification.confidence >= verification.required_confidence && !commit_state.blocked.contains(&op.id)
}

/// Deterministically clamps a verification update's confidence to `1.0`.
#[must_use]
pub fn apply_verification(verification: VerificationState, observed_confidence: f64) -> VerificationState {
    VerificationState { confidence: observed_confidence.min(1.0), required_confidence: verification.required_confidence }
}

/// Commits to `op`, returning the updated state. `committed_count` always
/// increases by one; `blocked` gains `op.blocks`, sorted and deduplicated;
/// `option_value` decreases by one per committed operator, floored at `0`.
#[must_use]
pub fn commit(op: &CommitOperator, commit_state: &CommitmentState) -> CommitmentState {
    let mut blocked: BTreeSet<String> = commit_state.blocked.iter().cloned().collect();
    for blocked_id in &op.blocks {
        blocked.insert(blocked_id.clone());
    }
    CommitmentState {
        blocked: blocked.into_iter().collect(),
        committed_count: commit_state.committed_count + 1,
        option_value: commit_state.option_value.saturating_sub(1),
    }
}

/// The priced components of committing to one operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommitmentCost {
    /// The operator's intrinsic cost, independent of reversibility.
    pub base_cost: f64,
    /// Penalty from reversibility: `0.0` for fully reversible, the
    /// operator's `rollback_cost` for costly-reversible, and
    /// `rollback_cost` again (no further escalation, per the reversibility
    /// tag alone carrying the irreversible signal) for irreversible.
    pub commitment_penalty: f64,
    /// Value of option flexibility destroyed by this commitment, priced as
    /// `option_value_before - option_value_after` cast to `f64`.
    pub option_value_loss: f64,
    /// Sum of the three components above.
    pub total_cost: f64,
}

/// Prices committing to `op` given the option state before commitment.
#[must_use]
pub fn calculate_commitment_cost(op: &CommitOperator, option_state: &CommitmentState) -> CommitmentCost {
    let base_cost = 1.0;
    let commitment_penalty = match op.reversibility {
        ReversibilityTag::FullyReversible => 0.0,
        ReversibilityTag::CostlyReversible | ReversibilityTag::Irreversible => op.rollback_cost,
    };
    let option_value_before = option_state.option_value;
    let option_value_after = option_value_before.saturating_sub(1);
    #[allow(clippy::cast_precision_loss, reason = "option values are bounded by OPTION_VALUE_MAX=10, far below f64's exact-integer range")]
    let option_value_loss = (option_value_before - option_value_after) as f64;
    CommitmentCost { base_cost, commitment_penalty, option_value_loss, total_cost: base_cost + commitment_penalty + option_value_loss }
}
