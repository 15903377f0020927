// crates/mc-planner-plan/src/types.rs
// ============================================================================
// Module: Rig G Data Model
// Description: Plan nodes, edges, the partial-order plan, and the planning
//              decision envelope.
// Dependencies: mc-planner-core::canon, serde
// ============================================================================

//! ## Overview
//! The DAG's own data types. A [`PartialOrderPlan`] owns its nodes and edges
//! by value; `plan_digest` is a pure function of schema version, nodes, and
//! edges, recomputed once at construction and never mutated.

use std::collections::BTreeSet;

use mc_planner_core::canon::ContentHash;
use serde::Deserialize;
use serde::Serialize;

/// The cap enforced by [`crate::dag::build_dag_from_modules`]: a DAG with
/// more steps than this is rejected with `bound_exceeded` rather than built.
pub const MAX_DAG_NODES: usize = 200;

/// An atomic unit of work in a partial-order plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode<T> {
    /// Content hash of `{schema_version, module_id, module_type}`.
    pub id: ContentHash,
    /// The module identifier this node was built from, carried alongside
    /// `id` so constraint checks can look nodes up by the name a
    /// [`PlanConstraint`] names rather than by a recomputed hash.
    pub module_id: String,
    /// Arbitrary payload (a recipe step, a CI task, etc.).
    pub data: T,
    /// Opaque conflict tags. Any two nodes sharing a key are non-commuting
    /// even without a precedence edge between them.
    pub conflict_keys: BTreeSet<String>,
}

/// The constraint tag on a [`PlanEdge`]. `support` is deferred per the
/// current builder contract — the type still names it so a future builder
/// can emit it without a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeConstraint {
    /// `from` must complete before `to`.
    Dependency,
    /// `from` must be reachable from `to` within a bound, checked at
    /// feasibility time rather than encoded structurally.
    Reachability,
    /// Deferred: not currently emitted by any builder in this crate.
    Support,
}

/// A directed precedence edge between two node IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEdge {
    /// The precedent node.
    pub from: ContentHash,
    /// The dependent node.
    pub to: ContentHash,
    /// The constraint this edge represents.
    pub constraint: EdgeConstraint,
}

/// A DAG of plan nodes and precedence edges, identified by a content hash of
/// its own shape.
///
/// # Invariants
/// - Every edge endpoint exists in `nodes`.
/// - The graph is acyclic (enforced at construction and re-checked by
///   [`crate::linearize::linearize`]).
/// - `plan_digest` is a pure function of `schema_version`, `nodes`, `edges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialOrderPlan<T> {
    /// Schema version this plan was built under.
    pub schema_version: u32,
    /// Owned plan nodes.
    pub nodes: Vec<PlanNode<T>>,
    /// Owned precedence edges.
    pub edges: Vec<PlanEdge>,
    /// Content hash of `{schema_version, sorted node IDs, sorted
    /// "from→to:constraint" strings}`.
    pub plan_digest: ContentHash,
}

/// A constraint checked by [`crate::feasibility::check_feasibility`], as
/// distinct from the structural [`PlanEdge`]s a DAG is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanConstraint {
    /// `dependent_module_id` requires `required_module_id` to transitively
    /// precede it.
    Dependency {
        /// The module that depends on another.
        dependent_module_id: String,
        /// The module that must precede it.
        required_module_id: String,
    },
    /// `module_id` must be reachable within `max_distance`.
    Reachability {
        /// The module under a reachability bound.
        module_id: String,
        /// The maximum allowed distance.
        max_distance: u32,
        /// The observed distance. `None` is treated as unknown and accepted.
        current_distance: Option<u32>,
    },
    /// Like `Dependency`, but reports support-specific detail on violation.
    Support {
        /// The module that requires support.
        dependent_module_id: String,
        /// The module providing support.
        support_module_id: String,
    },
}

/// The result envelope every Rig G planning step returns: a success case
/// is a first-class outcome, and `blocked` is an expected result, not a
/// failure path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanningDecision<T> {
    /// The operation succeeded.
    Ok {
        /// The successful value.
        value: T,
    },
    /// An expected planning outcome prevented success (bound exceeded, an
    /// infeasible constraint, a version mismatch, no viable strategy).
    Blocked {
        /// A stable reason code (e.g. `"bound_exceeded"`).
        reason: String,
        /// A human-readable detail naming the specifics.
        detail: String,
    },
    /// A structural failure (e.g. a cycle).
    Error {
        /// A stable reason code (e.g. `"cycle_detected"`).
        reason: String,
        /// A human-readable detail naming the specifics.
        detail: String,
    },
}

impl<T> PlanningDecision<T> {
    /// Constructs an [`PlanningDecision::Ok`].
    pub fn ok(value: T) -> Self {
        Self::Ok { value }
    }

    /// Constructs a [`PlanningDecision::Blocked`].
    pub fn blocked(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Blocked { reason: reason.into(), detail: detail.into() }
    }

    /// Constructs a [`PlanningDecision::Error`].
    pub fn error(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Error { reason: reason.into(), detail: detail.into() }
    }

    /// Returns `true` when this decision is [`PlanningDecision::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Returns the success value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ok { value } => Some(value),
            Self::Blocked { .. } | Self::Error { .. } => None,
        }
    }
}

/// The result of [`crate::linearize::linearize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearizationResult {
    /// A total order over node IDs, consistent with all edges.
    pub order: Vec<ContentHash>,
    /// Ready-set size observed just before emitting the i-th node.
    pub ready_set_sizes: Vec<usize>,
    /// Content hash of `{schema_version, node IDs in order}`.
    pub linearization_digest: ContentHash,
}

/// An unordered pair of node IDs with no precedence path in either direction
/// and disjoint conflict keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommutingPair {
    /// One member of the pair.
    pub node_a: ContentHash,
    /// The other member of the pair.
    pub node_b: ContentHash,
}

/// A single constraint violation found by
/// [`crate::feasibility::check_feasibility`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityViolation {
    /// Index of the violated constraint in the input slice.
    pub constraint_index: usize,
    /// A stable reason code.
    pub reason: String,
    /// A human-readable detail naming the specifics.
    pub detail: String,
}

/// The full result of checking a plan's constraints. Carries every violation
/// found, not just the first — `compute_rig_g_signals` needs the complete
/// set to build its per-type rejection counts even when the plan as a whole
/// is blocked on the first violation encountered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityResult {
    /// Every violation found, in constraint order.
    pub violations: Vec<FeasibilityViolation>,
}

impl FeasibilityResult {
    /// Returns `true` when no violations were found.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Projects this result onto the `{kind: ok} | {kind: blocked}` decision
    /// envelope, using the first violation (by constraint order) as the
    /// blocking reason.
    #[must_use]
    pub fn decision(&self) -> PlanningDecision<()> {
        self.violations.first().map_or_else(
            || PlanningDecision::ok(()),
            |violation| PlanningDecision::blocked(violation.reason.clone(), violation.detail.clone()),
        )
    }
}

/// Instrumentation record summarizing one Rig G planning pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigGSignals {
    /// Number of nodes in the plan.
    pub node_count: usize,
    /// Number of edges in the plan.
    pub edge_count: usize,
    /// Mean ready-set size observed during linearization.
    pub ready_set_mean: f64,
    /// 95th-percentile ready-set size (round-half-up: `ceil(0.95n) - 1`).
    pub ready_set_p95: f64,
    /// Number of commuting pairs found.
    pub commuting_pair_count: usize,
    /// Whether the feasibility check passed.
    pub feasibility_passed: bool,
    /// Count of feasibility rejections, grouped by reason code.
    pub rejections_by_type: std::collections::BTreeMap<String, u32>,
    /// The plan's own content hash.
    pub plan_digest: ContentHash,
    /// The linearization's content hash.
    pub linearization_digest: ContentHash,
    /// Whether the planner degraded to a raw, unordered step list.
    pub degraded_to_raw_steps: bool,
}

/// Inputs to [`crate::signals::compute_rig_g_signals`].
pub struct SignalsInput<'a> {
    /// Number of plan nodes.
    pub node_count: usize,
    /// Number of plan edges.
    pub edge_count: usize,
    /// The plan's digest.
    pub plan_digest: &'a ContentHash,
    /// The linearization result.
    pub linearization: &'a LinearizationResult,
    /// The feasibility result, if a feasibility check was run.
    pub feasibility: Option<&'a FeasibilityResult>,
    /// Commuting pairs found, if computed.
    pub commuting_pairs: &'a [CommutingPair],
    /// Whether the planner degraded to a raw step list.
    pub degraded_to_raw_steps: bool,
}

/// The output of [`crate::advisor::advise_execution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionAdvice {
    /// Whether execution should proceed.
    pub should_proceed: bool,
    /// Why execution was blocked, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    /// Suggested parallelism, clamped to `[1, 3]`.
    pub suggested_parallelism: u32,
    /// Commuting pairs forwarded verbatim from the signals.
    pub reorderable_step_pairs: Vec<CommutingPair>,
    /// Whether a replan is advised.
    pub should_replan: bool,
    /// Why a replan was advised, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replan_reason: Option<String>,
}

/// Metadata handed to [`crate::advisor::advise_execution`].
pub struct AdvisorMeta<'a> {
    /// The schema version this metadata was produced under.
    pub version: u32,
    /// The signals to base the advice on.
    pub signals: &'a RigGSignals,
    /// Commuting pairs to forward verbatim when execution proceeds.
    pub commuting_pairs: &'a [CommutingPair],
}

/// The current execution-advisor schema version. Metadata at any other
/// version is rejected fail-closed.
pub const CURRENT_VERSION: u32 = 1;
