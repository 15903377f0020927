// crates/mc-planner-temporal/src/risk.rs
// ============================================================================
// Module: P10 Risk-Aware Planner
// Description: Exact-mass stochastic action expansion, a per-risk-kind
//              ledger, and a bounded scenario graph.
// Dependencies: mc-planner-core::canon, crate::error
// ============================================================================

//! ## Overview
//! Every stochastic action's outcome masses sum to [`MASS_TOTAL`] parts per
//! million exactly; a deviation makes the action illegal rather than a
//! silently-normalized probability. Failure is never author-asserted — it
//! is derived per outcome by applying its effects and checking safety
//! invariants afterward. A ledger tracks remaining risk budget per risk
//! kind; an action that would drive any entry below zero is rejected
//! whole, never partially applied.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use mc_planner_core::canon::ContentHash;
use mc_planner_core::canon::content_hash;
use serde::Deserialize;
use serde::Serialize;

use crate::error::TemporalError;

/// Total outcome mass every stochastic action's outcomes must sum to,
/// in parts per million, exactly.
pub const MASS_TOTAL: u64 = 1_000_000;
/// Scenario-graph node-count cap.
pub const MAX_SCENARIO_NODES: usize = 300;
/// Scenario-graph depth cap.
pub const MAX_SCENARIO_DEPTH: usize = 50;
/// Per-action outcome-count cap. No fixture or constant elsewhere names a
/// different value, so the planner pins this one and documents it
/// alongside the other P10 bounds.
pub const MAX_OUTCOMES_PER_ACTION: usize = 16;

/// Agent-observable numeric state, keyed by property name.
pub type WorldState = BTreeMap<String, f64>;

/// A safety invariant tagged with the risk kind it contributes to when
/// violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInvariant {
    /// Invariant identifier.
    pub id: String,
    /// Property this invariant bounds.
    pub property: String,
    /// Minimum acceptable value.
    pub threshold: f64,
    /// Risk kind this invariant's violations are debited against.
    pub risk_kind: String,
}

/// One declared outcome of a stochastic action, before failure derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDecl {
    /// Outcome identifier; also the sort key and tie-break.
    pub outcome_id: String,
    /// This outcome's probability mass, in parts per million.
    pub mass_ppm: u64,
    /// Additive effects applied to state when this outcome is realized.
    pub effects: BTreeMap<String, f64>,
}

/// A stochastic action declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticAction {
    /// Action identifier.
    pub id: String,
    /// Minimum property values required for this action to apply.
    pub preconditions: BTreeMap<String, f64>,
    /// This action's possible outcomes. Masses must sum to [`MASS_TOTAL`].
    pub outcomes: Vec<OutcomeDecl>,
}

/// Where a ledger's initial values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSource {
    /// The caller's state declared initial budgets per risk kind.
    State,
    /// No state-declared budget existed; `epsilon_ppm` per kind was used.
    ConfigDefault,
}

/// Remaining risk budget per risk kind. Debited only by [`expand_action`];
/// never goes negative — an action that would do so is rejected whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLedger {
    /// Remaining budget in parts per million, keyed by risk kind.
    entries: BTreeMap<String, u64>,
}

impl RiskLedger {
    /// Returns the remaining budget for `risk_kind`, or `0` if untracked.
    #[must_use]
    pub fn remaining(&self, risk_kind: &str) -> u64 {
        self.entries.get(risk_kind).copied().unwrap_or(0)
    }

    /// Returns every tracked risk kind's remaining budget.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, u64> {
        &self.entries
    }
}

/// Builds the initial ledger: `state_declared` values take precedence
/// ([`BudgetSource::State`]); risk kinds declared only in `invariants` fall
/// back to `epsilon_ppm` ([`BudgetSource::ConfigDefault`]). Kinds declared
/// in both with differing values produce a mismatch warning but the
/// state-declared value wins.
#[must_use]
pub fn initialize_ledger(
    state_declared: Option<&BTreeMap<String, u64>>,
    invariants: &[RiskInvariant],
    epsilon_ppm: u64,
) -> (RiskLedger, BudgetSource, Vec<String>) {
    let mut entries = BTreeMap::new();
    let mut warnings = Vec::new();
    let source = if state_declared.is_some() { BudgetSource::State } else { BudgetSource::ConfigDefault };

    for invariant in invariants {
        let config_value = epsilon_ppm;
        let value = match state_declared.and_then(|declared| declared.get(&invariant.risk_kind)) {
            Some(declared_value) => {
                if *declared_value != config_value {
                    warnings.push(format!(
                        "risk kind \"{}\": state-declared budget {declared_value} ppm differs from config default {config_value} ppm",
                        invariant.risk_kind
                    ));
                }
                *declared_value
            }
            None => config_value,
        };
        entries.insert(invariant.risk_kind.clone(), value);
    }

    (RiskLedger { entries }, source, warnings)
}

/// Result of expanding one outcome: its resulting state and derived
/// failure status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeResult {
    /// The outcome's id, echoed for audit.
    pub outcome_id: String,
    /// The outcome's mass, in parts per million.
    pub mass_ppm: u64,
    /// Whether this outcome violates any safety invariant, derived from
    /// its post-effect state — never author-asserted.
    pub is_failure: bool,
    /// Ids of every invariant this outcome violates.
    pub violated_invariants: Vec<String>,
}

/// Why [`expand_action`] did not produce an expanded set of outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionRejection {
    /// A precondition was not satisfied by the current state.
    PreconditionUnsatisfied,
    /// Expanding would drive a ledger entry below zero.
    RiskBudgetExceeded,
}

/// Outcome of attempting to expand a stochastic action at a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpansionOutcome {
    /// The action was rejected; the ledger is unchanged.
    Rejected(ExpansionRejection),
    /// The action expanded successfully.
    Expanded {
        /// Every outcome, sorted by `outcome_id` ascending.
        outcomes: Vec<OutcomeResult>,
        /// The ledger after debiting failure-outcome masses.
        ledger_after: RiskLedger,
    },
}

/// Expands `action` against `state` and `ledger`.
///
/// Preconditions are checked first (outcome: [`ExpansionRejection::PreconditionUnsatisfied`]).
/// Outcome masses are then validated against [`MASS_TOTAL`] — a deviation
/// is a contract violation, not a planning outcome, so it raises
/// [`TemporalError::MassNotConserved`] instead of returning a rejection.
/// Outcomes are sorted by id, failure is derived per outcome from
/// `invariants`, and the ledger is debited per risk kind by the sum of
/// that kind's failure-outcome masses (each outcome counted once per
/// kind even if it violates multiple invariants sharing it). If any entry
/// would go below zero the whole action is rejected and the ledger is
/// returned unchanged.
///
/// # Errors
///
/// Returns [`TemporalError::MassNotConserved`] when `action`'s outcome
/// masses do not sum to [`MASS_TOTAL`].
pub fn expand_action(
    action: &StochasticAction,
    state: &WorldState,
    invariants: &[RiskInvariant],
    ledger: &RiskLedger,
) -> Result<ExpansionOutcome, TemporalError> {
    let preconditions_met = action.preconditions.iter().all(|(property, min)| state.get(property).copied().unwrap_or(0.0) >= *min);
    if !preconditions_met {
        return Ok(ExpansionOutcome::Rejected(ExpansionRejection::PreconditionUnsatisfied));
    }

    let total_ppm: u64 = action.outcomes.iter().map(|o| o.mass_ppm).sum();
    if total_ppm != MASS_TOTAL {
        return Err(TemporalError::MassNotConserved { action_id: action.id.clone(), total_ppm });
    }

    let mut sorted: Vec<&OutcomeDecl> = action.outcomes.iter().collect();
    sorted.sort_by(|a, b| a.outcome_id.cmp(&b.outcome_id));

    let mut results = Vec::with_capacity(sorted.len());
    let mut debits: BTreeMap<String, u64> = BTreeMap::new();
    for outcome in &sorted {
        let mut resulting_state = state.clone();
        for (property, delta) in &outcome.effects {
            *resulting_state.entry(property.clone()).or_insert(0.0) += delta;
        }
        let mut violated: Vec<String> = Vec::new();
        let mut kinds_hit: Vec<&str> = Vec::new();
        for invariant in invariants {
            if resulting_state.get(&invariant.property).copied().unwrap_or(0.0) < invariant.threshold {
                violated.push(invariant.id.clone());
                if !kinds_hit.contains(&invariant.risk_kind.as_str()) {
                    kinds_hit.push(&invariant.risk_kind);
                }
            }
        }
        violated.sort();
        let is_failure = !violated.is_empty();
        if is_failure {
            for kind in kinds_hit {
                *debits.entry(kind.to_string()).or_insert(0) += outcome.mass_ppm;
            }
        }
        results.push(OutcomeResult { outcome_id: outcome.outcome_id.clone(), mass_ppm: outcome.mass_ppm, is_failure, violated_invariants: violated });
    }

    let mut new_entries = ledger.entries.clone();
    for (kind, amount) in &debits {
        let remaining = new_entries.get(kind).copied().unwrap_or(0);
        if *amount > remaining {
            return Ok(ExpansionOutcome::Rejected(ExpansionRejection::RiskBudgetExceeded));
        }
    }
    for (kind, amount) in debits {
        if let Some(entry) = new_entries.get_mut(&kind) {
            *entry -= amount;
        }
    }

    Ok(ExpansionOutcome::Expanded { outcomes: results, ledger_after: RiskLedger { entries: new_entries } })
}

/// How per-step failure probabilities combine into a policy-wide bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAggregation {
    /// Sum of per-step failure PPM, capped at [`MASS_TOTAL`].
    UnionBound,
    /// `1 - ∏(1 - p_i)`, computed in PPM.
    IndependentProduct,
}

/// Aggregates a sequence of per-step failure masses (each in PPM) into one
/// policy-wide failure-probability bound, per `mode`.
#[must_use]
pub fn aggregate_risk(failure_ppms: &[u64], mode: RiskAggregation) -> u64 {
    match mode {
        RiskAggregation::UnionBound => failure_ppms.iter().fold(0u64, |acc, p| (acc + p).min(MASS_TOTAL)),
        RiskAggregation::IndependentProduct => {
            let mut acc_success_ppm = u128::from(MASS_TOTAL);
            for p in failure_ppms {
                acc_success_ppm = acc_success_ppm * u128::from(MASS_TOTAL - p.min(&MASS_TOTAL)) / u128::from(MASS_TOTAL);
            }
            let acc_success_ppm = u64::try_from(acc_success_ppm).unwrap_or(MASS_TOTAL);
            MASS_TOTAL - acc_success_ppm
        }
    }
}

/// Per-outcome observed counts, keyed by `outcome_id`.
pub type ObservationCounts = BTreeMap<String, u64>;

/// Re-derives `action`'s outcome masses from `observations` via largest-
/// remainder apportionment (the Hamilton method), preserving [`MASS_TOTAL`]
/// exactly. Outcome ids and order are left untouched; only `mass_ppm`
/// changes. Ties in the leftover-PPM distribution break by descending
/// remainder, then ascending `outcome_id`. When every observation count is
/// zero this is a deterministic no-op, since there is nothing to learn
/// from.
#[must_use]
pub fn update_risk_model(action: &StochasticAction, observations: &ObservationCounts) -> StochasticAction {
    let total_observed: u64 = action.outcomes.iter().map(|o| observations.get(&o.outcome_id).copied().unwrap_or(0)).sum();
    if total_observed == 0 {
        return action.clone();
    }
    let total_observed = u128::from(total_observed);

    let mut shares: Vec<(String, u64, u128)> = Vec::with_capacity(action.outcomes.len());
    let mut allocated_total = 0u64;
    for outcome in &action.outcomes {
        let observed = u128::from(observations.get(&outcome.outcome_id).copied().unwrap_or(0));
        let exact = observed * u128::from(MASS_TOTAL);
        let floor_ppm = u64::try_from(exact / total_observed).unwrap_or(MASS_TOTAL);
        let remainder = exact % total_observed;
        allocated_total += floor_ppm;
        shares.push((outcome.outcome_id.clone(), floor_ppm, remainder));
    }

    let mut leftover = MASS_TOTAL.saturating_sub(allocated_total);
    let mut by_remainder: Vec<usize> = (0..shares.len()).collect();
    by_remainder.sort_by(|&a, &b| shares[b].2.cmp(&shares[a].2).then_with(|| shares[a].0.cmp(&shares[b].0)));
    for index in by_remainder {
        if leftover == 0 {
            break;
        }
        shares[index].1 += 1;
        leftover -= 1;
    }

    let mass_by_id: BTreeMap<String, u64> = shares.into_iter().map(|(id, ppm, _)| (id, ppm)).collect();
    let outcomes = action
        .outcomes
        .iter()
        .map(|outcome| OutcomeDecl {
            outcome_id: outcome.outcome_id.clone(),
            mass_ppm: mass_by_id.get(&outcome.outcome_id).copied().unwrap_or(outcome.mass_ppm),
            effects: outcome.effects.clone(),
        })
        .collect();

    StochasticAction { id: action.id.clone(), preconditions: action.preconditions.clone(), outcomes }
}

/// A rejected action recorded in a scenario graph's explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedAction {
    /// The rejected action's id.
    pub action_id: String,
    /// Why it was rejected.
    pub reason: String,
}

/// One node of a scenario graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioNode {
    /// Node id, assigned in BFS discovery order.
    pub id: String,
    /// Depth from the root.
    pub depth: usize,
    /// Content hash of this node's state.
    pub state_digest: ContentHash,
    /// Why this node stopped advancing; `None` while it has not yet been
    /// classified, or once expansion from it succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_reason: Option<TerminalReason>,
}

/// One edge of a scenario graph: a chance branch realizing one action
/// outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEdge {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// The action this edge's outcome belongs to.
    pub action_id: String,
    /// The realized outcome's id.
    pub outcome_id: String,
    /// The outcome's mass, in parts per million.
    pub mass_ppm: u64,
    /// Whether the realized outcome is a failure.
    pub is_failure: bool,
}

/// Why a scenario graph stopped expanding short of exhausting its frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioTruncationReason {
    /// [`MAX_SCENARIO_NODES`] was reached.
    NodeCap,
    /// [`MAX_SCENARIO_DEPTH`] was reached.
    DepthCap,
}

/// Whether a scenario graph's risk constraint is known to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintStatus {
    /// The policy failure upper bound is within epsilon, untruncated, and
    /// the goal is reachable.
    Satisfied,
    /// The policy failure upper bound exceeds epsilon.
    Violated,
    /// Truncation or an unreachable goal leaves the status undetermined.
    Unknown,
}

/// Why a scenario-graph node stopped advancing, for every node at which
/// expansion ended (the root included, if it never expands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// No action's preconditions were satisfied at this node.
    NoFeasibleActions,
    /// Every precondition-satisfied action was rejected for budget.
    RiskBudgetExhausted,
    /// This node's own state violates a safety invariant.
    SafetyViolated,
    /// [`MAX_SCENARIO_DEPTH`] was reached at this node.
    HorizonReached,
    /// [`MAX_SCENARIO_NODES`] was reached while this node was being expanded.
    NodeCapReached,
    /// The goal predicate holds at this node.
    GoalReached,
}

/// Explains a scenario graph's shape: the risk budget consumed per kind
/// across the whole graph, and every action rejected somewhere in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioExplanation {
    /// Total PPM debited per risk kind, summed across every successful
    /// expansion anywhere in the graph.
    pub risk_deltas: BTreeMap<String, u64>,
    /// Actions that could not be expanded somewhere in the graph, and why.
    pub rejected_actions: Vec<RejectedAction>,
}

/// The complete result of one bounded scenario-graph build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGraph {
    /// Every node discovered, in BFS order.
    pub nodes: Vec<ScenarioNode>,
    /// Every edge discovered, in BFS order.
    pub edges: Vec<ScenarioEdge>,
    /// The root node's id.
    pub root_node_id: String,
    /// `nodes.len()`.
    pub total_nodes: usize,
    /// Maximum depth reached.
    pub max_depth: usize,
    /// Maximum chance fanout (outcomes) from a single expanded action.
    pub max_chance_fanout: usize,
    /// Whether the risk constraint is known to hold.
    pub constraint_status: ConstraintStatus,
    /// Whether the goal state was reached by any node.
    pub goal_reachable: bool,
    /// Whether expansion stopped before exhausting the frontier.
    pub was_truncated: bool,
    /// Why expansion stopped, if truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation_reason: Option<ScenarioTruncationReason>,
    /// The worst-path aggregated failure probability, in PPM.
    pub policy_failure_upper_bound_ppm: u64,
    /// The conditional-value-at-risk cost over the tail of path-failure
    /// bounds seen across the graph, in PPM; `None` when no path produced
    /// any failure mass to average over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvar_cost: Option<u64>,
    /// Risk-budget consumption and rejected-action explanation.
    pub explanation: ScenarioExplanation,
}

/// One BFS-queue entry awaiting expansion.
struct ScenarioFrontier {
    /// The node this entry expands from.
    node_id: String,
    /// Index of this entry's node in the graph's `nodes` vector.
    node_index: usize,
    /// World state at this node.
    state: WorldState,
    /// Risk ledger at this node.
    ledger: RiskLedger,
    /// Depth from the root.
    depth: usize,
    /// Failure masses accumulated along the path to this node.
    path_failure_ppms: Vec<u64>,
}

/// Whether `state` itself violates any of `invariants`, independent of any
/// action.
fn state_violates_invariants(state: &WorldState, invariants: &[RiskInvariant]) -> bool {
    invariants.iter().any(|invariant| state.get(&invariant.property).copied().unwrap_or(0.0) < invariant.threshold)
}

/// Builds a bounded scenario graph by repeatedly expanding every available
/// action (sorted by id) at each frontier node, branching once per
/// outcome. Stops at [`MAX_SCENARIO_NODES`] or [`MAX_SCENARIO_DEPTH`]. Each
/// node is classified with a [`TerminalReason`] in priority order: a
/// safety violation in the node's own state, then a reached goal, then the
/// depth cap, then the node cap, then (if no action expanded from it)
/// whichever of [`TerminalReason::NoFeasibleActions`] or
/// [`TerminalReason::RiskBudgetExhausted`] applies.
///
/// # Errors
///
/// Returns [`TemporalError::MassNotConserved`] when any action's outcome
/// masses do not sum to [`MASS_TOTAL`].
#[allow(clippy::too_many_arguments, reason = "mirrors the scenario-graph build contract's inputs one-to-one")]
pub fn plan_risk_graph(
    initial_state: &WorldState,
    initial_ledger: &RiskLedger,
    actions: &[StochasticAction],
    invariants: &[RiskInvariant],
    aggregation: RiskAggregation,
    epsilon_ppm: u64,
    is_goal: impl Fn(&WorldState) -> bool,
) -> Result<ScenarioGraph, TemporalError> {
    let root_id = "s0".to_string();
    let mut nodes = vec![ScenarioNode { id: root_id.clone(), depth: 0, state_digest: content_hash(initial_state)?, terminal_reason: None }];
    let mut edges = Vec::new();
    let mut rejected_actions = Vec::new();
    let mut risk_deltas: BTreeMap<String, u64> = BTreeMap::new();
    let mut path_bounds: Vec<u64> = Vec::new();
    let mut was_truncated = false;
    let mut truncation_reason = None;
    let mut max_chance_fanout = 0usize;
    let mut goal_reachable = is_goal(initial_state);
    let mut worst_failure_ppm = 0u64;

    let mut sorted_actions: Vec<&StochasticAction> = actions.iter().collect();
    sorted_actions.sort_by(|a, b| a.id.cmp(&b.id));

    let mut queue: VecDeque<ScenarioFrontier> = VecDeque::new();
    queue.push_back(ScenarioFrontier { node_id: root_id.clone(), node_index: 0, state: initial_state.clone(), ledger: initial_ledger.clone(), depth: 0, path_failure_ppms: Vec::new() });

    while let Some(current) = queue.pop_front() {
        if state_violates_invariants(&current.state, invariants) {
            nodes[current.node_index].terminal_reason = Some(TerminalReason::SafetyViolated);
            continue;
        }
        if is_goal(&current.state) {
            nodes[current.node_index].terminal_reason = Some(TerminalReason::GoalReached);
            continue;
        }
        if current.depth >= MAX_SCENARIO_DEPTH {
            nodes[current.node_index].terminal_reason = Some(TerminalReason::HorizonReached);
            was_truncated = true;
            truncation_reason = Some(ScenarioTruncationReason::DepthCap);
            continue;
        }
        if nodes.len() >= MAX_SCENARIO_NODES {
            nodes[current.node_index].terminal_reason = Some(TerminalReason::NodeCapReached);
            was_truncated = true;
            truncation_reason = Some(ScenarioTruncationReason::NodeCap);
            break;
        }

        let mut any_precondition_satisfied = false;
        let mut any_expanded = false;
        for action in &sorted_actions {
            match expand_action(action, &current.state, invariants, &current.ledger)? {
                ExpansionOutcome::Rejected(ExpansionRejection::PreconditionUnsatisfied) => {}
                ExpansionOutcome::Rejected(ExpansionRejection::RiskBudgetExceeded) => {
                    any_precondition_satisfied = true;
                    rejected_actions.push(RejectedAction { action_id: action.id.clone(), reason: "risk_budget_exceeded".to_string() });
                }
                ExpansionOutcome::Expanded { outcomes, ledger_after } => {
                    any_precondition_satisfied = true;
                    any_expanded = true;
                    max_chance_fanout = max_chance_fanout.max(outcomes.len());
                    for (kind, before) in current.ledger.entries() {
                        let delta = before - ledger_after.remaining(kind);
                        if delta != 0 {
                            *risk_deltas.entry(kind.clone()).or_insert(0) += delta;
                        }
                    }
                    for outcome in outcomes {
                        if nodes.len() >= MAX_SCENARIO_NODES {
                            was_truncated = true;
                            truncation_reason = Some(ScenarioTruncationReason::NodeCap);
                            break;
                        }
                        let mut next_state = current.state.clone();
                        for (property, delta) in &action.outcomes.iter().find(|o| o.outcome_id == outcome.outcome_id).map(|o| o.effects.clone()).unwrap_or_default() {
                            *next_state.entry(property.clone()).or_insert(0.0) += delta;
                        }
                        let node_id = format!("s{}", nodes.len());
                        let node_index = nodes.len();
                        nodes.push(ScenarioNode { id: node_id.clone(), depth: current.depth + 1, state_digest: content_hash(&next_state)?, terminal_reason: None });
                        edges.push(ScenarioEdge {
                            from: current.node_id.clone(),
                            to: node_id.clone(),
                            action_id: action.id.clone(),
                            outcome_id: outcome.outcome_id.clone(),
                            mass_ppm: outcome.mass_ppm,
                            is_failure: outcome.is_failure,
                        });

                        let mut path_failures = current.path_failure_ppms.clone();
                        if outcome.is_failure {
                            path_failures.push(outcome.mass_ppm);
                        }
                        let path_bound = aggregate_risk(&path_failures, aggregation);
                        worst_failure_ppm = worst_failure_ppm.max(path_bound);
                        path_bounds.push(path_bound);
                        goal_reachable = goal_reachable || is_goal(&next_state);

                        queue.push_back(ScenarioFrontier {
                            node_id,
                            node_index,
                            state: next_state,
                            ledger: ledger_after.clone(),
                            depth: current.depth + 1,
                            path_failure_ppms: path_failures,
                        });
                    }
                }
            }
        }

        if !any_expanded {
            nodes[current.node_index].terminal_reason = Some(if any_precondition_satisfied {
                TerminalReason::RiskBudgetExhausted
            } else {
                TerminalReason::NoFeasibleActions
            });
        }
    }

    let constraint_status = if worst_failure_ppm <= epsilon_ppm && !was_truncated && goal_reachable {
        ConstraintStatus::Satisfied
    } else if worst_failure_ppm > epsilon_ppm {
        ConstraintStatus::Violated
    } else {
        ConstraintStatus::Unknown
    };

    path_bounds.sort_unstable();
    let cvar_cost = if path_bounds.is_empty() {
        None
    } else {
        let threshold_index = path_bounds.len() * 9 / 10;
        let tail = &path_bounds[threshold_index..];
        let tail_len = u64::try_from(tail.len()).unwrap_or(1);
        let sum: u128 = tail.iter().map(|&v| u128::from(v)).sum();
        let mean = sum / u128::from(tail_len.max(1));
        Some(u64::try_from(mean).unwrap_or(MASS_TOTAL))
    };

    let total_nodes = nodes.len();
    let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    Ok(ScenarioGraph {
        nodes,
        edges,
        root_node_id: root_id,
        total_nodes,
        max_depth,
        max_chance_fanout,
        constraint_status,
        goal_reachable,
        was_truncated,
        truncation_reason,
        policy_failure_upper_bound_ppm: worst_failure_ppm,
        cvar_cost,
        explanation: ScenarioExplanation { risk_deltas, rejected_actions },
    })
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only panic-based assertions are permitted."
    )]
    use super::*;
    use proptest::prelude::*;

    fn state(entries: &[(&str, f64)]) -> WorldState {
        entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    // S8: an action whose outcomes do not sum to MASS_TOTAL is illegal.
    #[test]
    fn s8_mass_not_conserved_is_rejected() {
        let action = StochasticAction {
            id: "risky_jump".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "a".to_string(), mass_ppm: 500_000, effects: BTreeMap::new() },
                OutcomeDecl { outcome_id: "b".to_string(), mass_ppm: 300_000, effects: BTreeMap::new() },
                OutcomeDecl { outcome_id: "c".to_string(), mass_ppm: 150_000, effects: BTreeMap::new() },
            ],
        };
        let ledger = RiskLedger { entries: BTreeMap::new() };
        let err = expand_action(&action, &state(&[]), &[], &ledger).unwrap_err();
        match err {
            TemporalError::MassNotConserved { action_id, total_ppm } => {
                assert_eq!(action_id, "risky_jump");
                assert_eq!(total_ppm, 950_000);
            }
            TemporalError::Canonicalize(_) => panic!("unexpected canonicalize error"),
        }
    }

    // S9: a tight ledger rejects an action whose failure mass would drain it.
    #[test]
    fn s9_tight_budget_rejects_action() {
        let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let action = StochasticAction {
            id: "cross_lava".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "burn".to_string(), mass_ppm: 50_000, effects: BTreeMap::from([("health".to_string(), -10.0)]) },
                OutcomeDecl { outcome_id: "survive".to_string(), mass_ppm: 950_000, effects: BTreeMap::new() },
            ],
        };
        let ledger = RiskLedger { entries: BTreeMap::from([("death".to_string(), 10_000)]) };
        let outcome = expand_action(&action, &state(&[("health", 10.0)]), &invariants, &ledger).unwrap();
        assert_eq!(outcome, ExpansionOutcome::Rejected(ExpansionRejection::RiskBudgetExceeded));
    }

    // Property 7: outcome masses always sum to MASS_TOTAL for an expanded action.
    // Property 8: ledger entries never increase across an expansion.
    proptest! {
        #[test]
        fn mass_conservation_holds_for_expanded_actions(ok_ppm in 0u64..=MASS_TOTAL) {
            let action = StochasticAction {
                id: "mine".to_string(),
                preconditions: BTreeMap::new(),
                outcomes: vec![
                    OutcomeDecl { outcome_id: "ok".to_string(), mass_ppm: ok_ppm, effects: BTreeMap::new() },
                    OutcomeDecl { outcome_id: "fail".to_string(), mass_ppm: MASS_TOTAL - ok_ppm, effects: BTreeMap::new() },
                ],
            };
            let ledger = RiskLedger { entries: BTreeMap::new() };
            let result = expand_action(&action, &state(&[]), &[], &ledger).unwrap();
            let ExpansionOutcome::Expanded { outcomes, .. } = result else { panic!("expected expansion") };
            let total: u64 = outcomes.iter().map(|o| o.mass_ppm).sum();
            prop_assert_eq!(total, MASS_TOTAL);
        }

        #[test]
        fn ledger_monotonicity_holds_across_expansion(burn_ppm in 0u64..=MASS_TOTAL, budget in 0u64..=MASS_TOTAL) {
            let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
            let action = StochasticAction {
                id: "cross_lava".to_string(),
                preconditions: BTreeMap::new(),
                outcomes: vec![
                    OutcomeDecl { outcome_id: "burn".to_string(), mass_ppm: burn_ppm, effects: BTreeMap::from([("health".to_string(), -10.0)]) },
                    OutcomeDecl { outcome_id: "survive".to_string(), mass_ppm: MASS_TOTAL - burn_ppm, effects: BTreeMap::new() },
                ],
            };
            let ledger = RiskLedger { entries: BTreeMap::from([("death".to_string(), budget)]) };
            let result = expand_action(&action, &state(&[("health", 10.0)]), &invariants, &ledger).unwrap();
            match result {
                ExpansionOutcome::Expanded { ledger_after, .. } => {
                    for (kind, before) in ledger.entries() {
                        prop_assert!(ledger_after.remaining(kind) <= *before);
                    }
                }
                ExpansionOutcome::Rejected(ExpansionRejection::RiskBudgetExceeded) => {}
                ExpansionOutcome::Rejected(ExpansionRejection::PreconditionUnsatisfied) => {
                    prop_assert!(false, "cross_lava declares no preconditions");
                }
            }
        }
    }

    #[test]
    fn precondition_unsatisfied_is_rejected_before_mass_check() {
        let action = StochasticAction {
            id: "needs_pickaxe".to_string(),
            preconditions: BTreeMap::from([("pickaxe".to_string(), 1.0)]),
            outcomes: vec![OutcomeDecl { outcome_id: "ok".to_string(), mass_ppm: 500_000, effects: BTreeMap::new() }],
        };
        let ledger = RiskLedger { entries: BTreeMap::new() };
        let result = expand_action(&action, &state(&[]), &[], &ledger).unwrap();
        assert_eq!(result, ExpansionOutcome::Rejected(ExpansionRejection::PreconditionUnsatisfied));
    }

    #[test]
    fn union_bound_sums_and_caps_at_mass_total() {
        assert_eq!(aggregate_risk(&[600_000, 600_000], RiskAggregation::UnionBound), MASS_TOTAL);
        assert_eq!(aggregate_risk(&[100_000, 200_000], RiskAggregation::UnionBound), 300_000);
    }

    #[test]
    fn independent_product_matches_closed_form_for_two_steps() {
        let result = aggregate_risk(&[100_000, 100_000], RiskAggregation::IndependentProduct);
        // 1 - 0.9*0.9 = 0.19
        assert_eq!(result, 190_000);
    }

    #[test]
    fn ledger_initializes_from_state_with_mismatch_warning() {
        let invariants = vec![RiskInvariant { id: "inv".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let declared = BTreeMap::from([("death".to_string(), 5_000u64)]);
        let (ledger, source, warnings) = initialize_ledger(Some(&declared), &invariants, 10_000);
        assert_eq!(source, BudgetSource::State);
        assert_eq!(ledger.remaining("death"), 5_000);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn ledger_falls_back_to_config_default_without_state() {
        let invariants = vec![RiskInvariant { id: "inv".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let (ledger, source, warnings) = initialize_ledger(None, &invariants, 10_000);
        assert_eq!(source, BudgetSource::ConfigDefault);
        assert_eq!(ledger.remaining("death"), 10_000);
        assert!(warnings.is_empty());
    }

    #[test]
    fn dead_end_with_no_feasible_action_is_classified_no_feasible_actions() {
        let action = StochasticAction {
            id: "needs_pickaxe".to_string(),
            preconditions: BTreeMap::from([("pickaxe".to_string(), 1.0)]),
            outcomes: vec![OutcomeDecl { outcome_id: "ok".to_string(), mass_ppm: MASS_TOTAL, effects: BTreeMap::new() }],
        };
        let ledger = RiskLedger { entries: BTreeMap::new() };
        let graph =
            plan_risk_graph(&state(&[]), &ledger, std::slice::from_ref(&action), &[], RiskAggregation::UnionBound, 0, |_| false).unwrap();
        assert_eq!(graph.nodes[0].terminal_reason, Some(TerminalReason::NoFeasibleActions));
    }

    #[test]
    fn dead_end_drained_by_budget_is_classified_risk_budget_exhausted() {
        let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let action = StochasticAction {
            id: "cross_lava".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "burn".to_string(), mass_ppm: 50_000, effects: BTreeMap::from([("health".to_string(), -10.0)]) },
                OutcomeDecl { outcome_id: "survive".to_string(), mass_ppm: 950_000, effects: BTreeMap::new() },
            ],
        };
        let ledger = RiskLedger { entries: BTreeMap::from([("death".to_string(), 10_000)]) };
        let graph = plan_risk_graph(
            &state(&[("health", 10.0)]),
            &ledger,
            std::slice::from_ref(&action),
            &invariants,
            RiskAggregation::UnionBound,
            0,
            |_| false,
        )
        .unwrap();
        assert_eq!(graph.nodes[0].terminal_reason, Some(TerminalReason::RiskBudgetExhausted));
    }

    #[test]
    fn goal_state_is_classified_goal_reached_without_expanding() {
        let action = StochasticAction {
            id: "mine".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![OutcomeDecl { outcome_id: "ok".to_string(), mass_ppm: MASS_TOTAL, effects: BTreeMap::new() }],
        };
        let ledger = RiskLedger { entries: BTreeMap::new() };
        let graph = plan_risk_graph(&state(&[("ore", 1.0)]), &ledger, std::slice::from_ref(&action), &[], RiskAggregation::UnionBound, 0, |s| {
            s.get("ore").copied().unwrap_or(0.0) >= 1.0
        })
        .unwrap();
        assert_eq!(graph.total_nodes, 1);
        assert_eq!(graph.nodes[0].terminal_reason, Some(TerminalReason::GoalReached));
        assert!(graph.goal_reachable);
    }

    #[test]
    fn safety_violated_state_is_classified_before_expansion() {
        let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let ledger = RiskLedger { entries: BTreeMap::new() };
        let graph =
            plan_risk_graph(&state(&[("health", 0.0)]), &ledger, &[], &invariants, RiskAggregation::UnionBound, 0, |_| false).unwrap();
        assert_eq!(graph.nodes[0].terminal_reason, Some(TerminalReason::SafetyViolated));
    }

    #[test]
    fn risk_deltas_accumulate_across_successful_expansions() {
        let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let action = StochasticAction {
            id: "cross_lava".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "burn".to_string(), mass_ppm: 50_000, effects: BTreeMap::from([("health".to_string(), -10.0)]) },
                OutcomeDecl { outcome_id: "survive".to_string(), mass_ppm: 950_000, effects: BTreeMap::from([("progress".to_string(), 1.0)]) },
            ],
        };
        let ledger = RiskLedger { entries: BTreeMap::from([("death".to_string(), 500_000)]) };
        let graph = plan_risk_graph(
            &state(&[("health", 10.0), ("progress", 0.0)]),
            &ledger,
            std::slice::from_ref(&action),
            &invariants,
            RiskAggregation::UnionBound,
            0,
            |s| s.get("progress").copied().unwrap_or(0.0) >= 1.0,
        )
        .unwrap();
        // The "burn" child violates safety and the "survive" child reaches the
        // goal, so only the root ever expands this action once.
        assert_eq!(graph.explanation.risk_deltas.get("death"), Some(&50_000));
    }

    #[test]
    fn cvar_cost_is_none_without_any_expanded_path() {
        let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let ledger = RiskLedger { entries: BTreeMap::new() };
        let graph =
            plan_risk_graph(&state(&[("health", 0.0)]), &ledger, &[], &invariants, RiskAggregation::UnionBound, 0, |_| false).unwrap();
        assert_eq!(graph.total_nodes, 1);
        assert_eq!(graph.cvar_cost, None, "a single-node graph has no path to aggregate a tail over");
    }

    #[test]
    fn cvar_cost_is_populated_when_the_graph_has_any_path() {
        let action = StochasticAction {
            id: "cross_lava".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "burn".to_string(), mass_ppm: 50_000, effects: BTreeMap::from([("health".to_string(), -10.0)]) },
                OutcomeDecl { outcome_id: "survive".to_string(), mass_ppm: 950_000, effects: BTreeMap::from([("progress".to_string(), 1.0)]) },
            ],
        };
        let invariants = vec![RiskInvariant { id: "inv_death".to_string(), property: "health".to_string(), threshold: 1.0, risk_kind: "death".to_string() }];
        let ledger = RiskLedger { entries: BTreeMap::from([("death".to_string(), 500_000)]) };
        let graph = plan_risk_graph(
            &state(&[("health", 10.0), ("progress", 0.0)]),
            &ledger,
            std::slice::from_ref(&action),
            &invariants,
            RiskAggregation::UnionBound,
            0,
            |s| s.get("progress").copied().unwrap_or(0.0) >= 1.0,
        )
        .unwrap();
        assert!(graph.cvar_cost.is_some());
    }

    #[test]
    fn update_risk_model_preserves_mass_total_exactly() {
        let action = StochasticAction {
            id: "mine".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "ok".to_string(), mass_ppm: 900_000, effects: BTreeMap::new() },
                OutcomeDecl { outcome_id: "fail".to_string(), mass_ppm: 100_000, effects: BTreeMap::new() },
            ],
        };
        let observations = ObservationCounts::from([("ok".to_string(), 7u64), ("fail".to_string(), 3u64)]);
        let updated = update_risk_model(&action, &observations);
        let total: u64 = updated.outcomes.iter().map(|o| o.mass_ppm).sum();
        assert_eq!(total, MASS_TOTAL);
        assert_eq!(updated.outcomes[0].outcome_id, "ok");
        assert_eq!(updated.outcomes[0].mass_ppm, 700_000);
        assert_eq!(updated.outcomes[1].mass_ppm, 300_000);
    }

    #[test]
    fn update_risk_model_is_deterministic_no_op_with_zero_observations() {
        let action = StochasticAction {
            id: "mine".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "ok".to_string(), mass_ppm: 900_000, effects: BTreeMap::new() },
                OutcomeDecl { outcome_id: "fail".to_string(), mass_ppm: 100_000, effects: BTreeMap::new() },
            ],
        };
        let updated = update_risk_model(&action, &ObservationCounts::new());
        assert_eq!(updated, action);
    }

    #[test]
    fn update_risk_model_breaks_leftover_ties_by_ascending_outcome_id() {
        let action = StochasticAction {
            id: "roll".to_string(),
            preconditions: BTreeMap::new(),
            outcomes: vec![
                OutcomeDecl { outcome_id: "a".to_string(), mass_ppm: 0, effects: BTreeMap::new() },
                OutcomeDecl { outcome_id: "b".to_string(), mass_ppm: 0, effects: BTreeMap::new() },
                OutcomeDecl { outcome_id: "c".to_string(), mass_ppm: 0, effects: BTreeMap::new() },
            ],
        };
        let observations = ObservationCounts::from([("a".to_string(), 1u64), ("b".to_string(), 1u64), ("c".to_string(), 1u64)]);
        let updated = update_risk_model(&action, &observations);
        let total: u64 = updated.outcomes.iter().map(|o| o.mass_ppm).sum();
        assert_eq!(total, MASS_TOTAL);
        // 1_000_000 / 3 = 333_333 remainder 1 each; the tie breaks on ascending id, so "a" gets the extra unit.
        assert_eq!(updated.outcomes[0].mass_ppm, 333_334);
        assert_eq!(updated.outcomes[1].mass_ppm, 333_333);
        assert_eq!(updated.outcomes[2].mass_ppm, 333_333);
    }
}
