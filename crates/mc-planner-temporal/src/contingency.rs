// crates/mc-planner-temporal/src/contingency.rs
// ============================================================================
// Module: P09 Contingency Planner
// Description: Deterministic policy-graph construction over forced and
//              chosen transitions, with tick-by-tick forced-transition
//              application and post-transition safety checking.
// Dependencies: mc-planner-core::canon
// ============================================================================

//! ## Overview
//! A policy graph branches on chosen actions (bounded by
//! [`MAX_BRANCH_FACTOR`]) and on state-triggered forced transitions,
//! bounded overall by [`MAX_POLICY_NODES`] and [`MAX_HORIZON`] ticks.
//! Building the graph from the same inputs twice produces the same node
//! count, edge set, and root id — nothing here reads wall-clock time or
//! iterates a `HashMap` where order would leak into the result.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::VecDeque;

use mc_planner_core::canon::ContentHash;
use mc_planner_core::canon::content_hash;
use serde::Deserialize;
use serde::Serialize;

use crate::error::TemporalError;

/// Node-count cap for one policy graph.
pub const MAX_POLICY_NODES: usize = 200;
/// Branch-factor cap: at most this many chosen-action edges leave a node.
pub const MAX_BRANCH_FACTOR: usize = 8;
/// Tick horizon cap: expansion stops once a node's tick reaches this bound.
pub const MAX_HORIZON: u64 = 1000;

/// Agent-observable numeric state, keyed by property name.
pub type WorldState = BTreeMap<String, f64>;

/// A transition declared to fire at an exact tick, applied tick-by-tick
/// inside whichever action's window contains it — never as a jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcedTransition {
    /// Transition identifier.
    pub id: String,
    /// The tick this transition fires at.
    pub fires_at_tick: u64,
    /// Additive effects applied to state when it fires.
    pub effects: BTreeMap<String, f64>,
}

/// A chosen action available at a policy node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDecl {
    /// Action identifier; also the tie-break and branch-factor truncation key.
    pub id: String,
    /// Tick this action's window starts at.
    pub start_tick: u64,
    /// Duration of this action's window, in ticks.
    pub duration_ticks: u64,
    /// Additive effects applied at the end of the window.
    pub effects: BTreeMap<String, f64>,
}

/// A state-triggered forced branch, evaluated independent of chosen actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Trigger identifier.
    pub id: String,
    /// Property this trigger watches.
    pub watched_property: String,
    /// Trigger fires when `watched_property ≥ threshold`.
    pub threshold: f64,
    /// Additive effects applied when it fires.
    pub effects: BTreeMap<String, f64>,
}

/// A safety invariant: `state[property] ≥ threshold` must hold after every
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyInvariant {
    /// Invariant identifier.
    pub id: String,
    /// Property this invariant bounds.
    pub property: String,
    /// Minimum acceptable value.
    pub threshold: f64,
}

/// Applies `action`'s window tick-by-tick: any `forced` transition whose
/// `fires_at_tick` falls inside `[action.start_tick, end)` is applied at
/// its own tick, then the action's own effects are applied at the window's
/// final tick.
#[must_use]
pub fn apply_action(state: &WorldState, action: &ActionDecl, forced: &[ForcedTransition]) -> WorldState {
    let mut next = state.clone();
    let end_tick = action.start_tick.saturating_add(action.duration_ticks);
    for tick in action.start_tick..end_tick {
        for transition in forced.iter().filter(|t| t.fires_at_tick == tick) {
            apply_effects(&mut next, &transition.effects);
        }
    }
    apply_effects(&mut next, &action.effects);
    next
}

/// Applies each `effects` delta to `state` in place, inserting new
/// properties starting from zero.
fn apply_effects(state: &mut WorldState, effects: &BTreeMap<String, f64>) {
    for (property, delta) in effects {
        *state.entry(property.clone()).or_insert(0.0) += delta;
    }
}

/// Returns the sorted ids of every invariant violated by `state`.
#[must_use]
pub fn check_safety(state: &WorldState, invariants: &[SafetyInvariant]) -> Vec<String> {
    let mut violated: Vec<String> = invariants
        .iter()
        .filter(|inv| state.get(&inv.property).copied().unwrap_or(0.0) < inv.threshold)
        .map(|inv| inv.id.clone())
        .collect();
    violated.sort();
    violated
}

/// Returns the sorted ids of every trigger that fires against `state`.
#[must_use]
pub fn evaluate_triggers(state: &WorldState, triggers: &[Trigger]) -> Vec<String> {
    let mut fired: Vec<String> = triggers
        .iter()
        .filter(|trigger| state.get(&trigger.watched_property).copied().unwrap_or(0.0) >= trigger.threshold)
        .map(|trigger| trigger.id.clone())
        .collect();
    fired.sort();
    fired
}

/// Whether a policy-graph edge represents a chosen action or a forced
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// An action the agent chose to take.
    Chosen,
    /// A forced transition independent of agent choice.
    Forced,
}

/// One node of a policy graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyNode {
    /// Node identifier, assigned in BFS discovery order (`"n0"`, `"n1"`, ...).
    pub id: String,
    /// Tick this node's state was reached at.
    pub tick: u64,
    /// Content hash of this node's state, for audit identity.
    pub state_digest: ContentHash,
    /// Invariant ids violated by this node's state.
    pub violations: Vec<String>,
}

/// One edge of a policy graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEdge {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Whether this edge is a chosen action or a forced transition.
    pub edge_kind: EdgeKind,
    /// The triggering forced-transition or trigger id, present only on
    /// [`EdgeKind::Forced`] edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

/// Why a policy graph stopped expanding short of exhausting its frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// [`MAX_POLICY_NODES`] was reached.
    NodeCap,
    /// [`MAX_HORIZON`] was reached.
    HorizonCap,
}

/// The complete, deterministic result of one policy-graph build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyGraph {
    /// Every node discovered, in BFS order.
    pub nodes: Vec<PolicyNode>,
    /// Every edge discovered, in BFS order.
    pub edges: Vec<PolicyEdge>,
    /// The root node's id.
    pub root_node_id: String,
    /// `nodes.len()`, exposed directly per the wire shape.
    pub total_nodes: usize,
    /// Whether expansion stopped before exhausting the frontier.
    pub was_truncated: bool,
    /// Why expansion stopped, if it was truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation_reason: Option<TruncationReason>,
}

/// One BFS-queue entry awaiting expansion.
struct Frontier {
    /// The node this entry expands from.
    node_id: String,
    /// World state at this node.
    state: WorldState,
    /// Tick at which this node is reached.
    tick: u64,
}

/// Builds a deterministic policy graph from an initial state, bounded by
/// [`MAX_POLICY_NODES`], [`MAX_BRANCH_FACTOR`], and [`MAX_HORIZON`].
/// Actions are sorted by id before branching so identical inputs always
/// produce identical graphs.
///
/// # Errors
///
/// Returns [`TemporalError`] when a state snapshot fails to canonicalize.
pub fn build_policy_graph(
    initial_state: &WorldState,
    actions: &[ActionDecl],
    forced: &[ForcedTransition],
    triggers: &[Trigger],
    invariants: &[SafetyInvariant],
) -> Result<PolicyGraph, TemporalError> {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut was_truncated = false;
    let mut truncation_reason = None;

    let root_id = "n0".to_string();
    nodes.push(PolicyNode {
        id: root_id.clone(),
        tick: 0,
        state_digest: content_hash(initial_state)?,
        violations: check_safety(initial_state, invariants),
    });

    let mut queue: VecDeque<Frontier> = VecDeque::new();
    queue.push_back(Frontier { node_id: root_id.clone(), state: initial_state.clone(), tick: 0 });

    let mut sorted_actions: Vec<&ActionDecl> = actions.iter().collect();
    sorted_actions.sort_by(|a, b| a.id.cmp(&b.id));

    while let Some(current) = queue.pop_front() {
        if current.tick >= MAX_HORIZON {
            was_truncated = true;
            truncation_reason = Some(TruncationReason::HorizonCap);
            continue;
        }
        if nodes.len() >= MAX_POLICY_NODES {
            was_truncated = true;
            truncation_reason = Some(TruncationReason::NodeCap);
            break;
        }

        for action in sorted_actions.iter().take(MAX_BRANCH_FACTOR) {
            if nodes.len() >= MAX_POLICY_NODES {
                was_truncated = true;
                truncation_reason = Some(TruncationReason::NodeCap);
                break;
            }
            let next_state = apply_action(&current.state, action, forced);
            let next_tick = action.start_tick.saturating_add(action.duration_ticks).max(current.tick);
            let node_id = format!("n{}", nodes.len());
            nodes.push(PolicyNode {
                id: node_id.clone(),
                tick: next_tick,
                state_digest: content_hash(&next_state)?,
                violations: check_safety(&next_state, invariants),
            });
            edges.push(PolicyEdge { from: current.node_id.clone(), to: node_id.clone(), edge_kind: EdgeKind::Chosen, triggered_by: None });
            queue.push_back(Frontier { node_id, state: next_state, tick: next_tick });
        }

        for trigger_id in evaluate_triggers(&current.state, triggers) {
            if nodes.len() >= MAX_POLICY_NODES {
                was_truncated = true;
                truncation_reason = Some(TruncationReason::NodeCap);
                break;
            }
            let Some(trigger) = triggers.iter().find(|t| t.id == trigger_id) else { continue };
            let mut next_state = current.state.clone();
            apply_effects(&mut next_state, &trigger.effects);
            let node_id = format!("n{}", nodes.len());
            nodes.push(PolicyNode {
                id: node_id.clone(),
                tick: current.tick,
                state_digest: content_hash(&next_state)?,
                violations: check_safety(&next_state, invariants),
            });
            edges.push(PolicyEdge {
                from: current.node_id.clone(),
                to: node_id.clone(),
                edge_kind: EdgeKind::Forced,
                triggered_by: Some(trigger_id),
            });
            queue.push_back(Frontier { node_id, state: next_state, tick: current.tick });
        }
    }

    let total_nodes = nodes.len();
    Ok(PolicyGraph { nodes, edges, root_node_id: root_id, total_nodes, was_truncated, truncation_reason })
}
