// crates/mc-planner-plan/src/linearize.rs
// ============================================================================
// Module: Deterministic Linearization
// Description: Kahn's algorithm with ascending-content-hash tie-breaks.
// Dependencies: crate::types, mc-planner-core::canon
// ============================================================================

//! ## Overview
//! `linearize` topologically sorts a [`PartialOrderPlan`], breaking ties by
//! ascending node ID so identical DAGs always linearize to the identical
//! order, regardless of input iteration order.

use std::collections::HashMap;

use mc_planner_core::canon::ContentHash;
use mc_planner_core::canon::content_hash;
use serde::Serialize;

use crate::error::PlanError;
use crate::types::LinearizationResult;
use crate::types::PartialOrderPlan;
use crate::types::PlanEdge;
use crate::types::PlanNode;
use crate::types::PlanningDecision;

#[derive(Serialize)]
struct LinearizationIdentity<'a> {
    schema_version: u32,
    node_ids: &'a [String],
}

struct ResidualGraph {
    in_degree: HashMap<ContentHash, usize>,
    successors: HashMap<ContentHash, Vec<ContentHash>>,
}

fn build_residual_graph<T>(nodes: &[PlanNode<T>], edges: &[PlanEdge]) -> ResidualGraph {
    let mut in_degree: HashMap<ContentHash, usize> =
        nodes.iter().map(|n| (n.id.clone(), 0usize)).collect();
    let mut successors: HashMap<ContentHash, Vec<ContentHash>> =
        nodes.iter().map(|n| (n.id.clone(), Vec::new())).collect();

    for edge in edges {
        if let Some(count) = in_degree.get_mut(&edge.to) {
            *count += 1;
        }
        successors.entry(edge.from.clone()).or_default().push(edge.to.clone());
    }

    ResidualGraph { in_degree, successors }
}

/// Inserts `id` into the sorted ready set at its correct position.
fn insert_sorted(ready: &mut Vec<ContentHash>, id: ContentHash) {
    let position = ready.binary_search(&id).unwrap_or_else(|insert_at| insert_at);
    ready.insert(position, id);
}

/// Runs Kahn's algorithm to completion or stall, returning the emission
/// order, the ready-set sizes observed before each emission, and — if the
/// graph could not be fully drained — the node IDs still blocked.
fn run_kahn<T>(nodes: &[PlanNode<T>], edges: &[PlanEdge]) -> (Vec<ContentHash>, Vec<usize>, Vec<ContentHash>) {
    let graph = build_residual_graph(nodes, edges);
    let mut in_degree = graph.in_degree;
    let successors = graph.successors;

    let mut ready: Vec<ContentHash> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| id.clone())
        .collect();
    ready.sort();

    let mut order = Vec::with_capacity(nodes.len());
    let mut ready_set_sizes = Vec::with_capacity(nodes.len());

    while !ready.is_empty() {
        ready_set_sizes.push(ready.len());
        let next = ready.remove(0);
        order.push(next.clone());

        if let Some(children) = successors.get(&next) {
            for child in children {
                if let Some(count) = in_degree.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        insert_sorted(&mut ready, child.clone());
                    }
                }
            }
        }
    }

    let remaining: Vec<ContentHash> = in_degree
        .into_iter()
        .filter(|(_, deg)| *deg > 0)
        .map(|(id, _)| id)
        .collect();

    (order, ready_set_sizes, remaining)
}

/// Returns up to five node IDs (as strings) left unreachable by Kahn's
/// algorithm, or `None` when the plan is fully acyclic.
#[must_use]
pub fn find_cycle_witness<T>(nodes: &[PlanNode<T>], edges: &[PlanEdge]) -> Option<Vec<String>> {
    let (_, _, remaining) = run_kahn(nodes, edges);
    if remaining.is_empty() {
        return None;
    }
    let mut witnesses: Vec<String> = remaining.iter().map(ToString::to_string).collect();
    witnesses.sort();
    witnesses.truncate(5);
    Some(witnesses)
}

/// Deterministically linearizes `plan`: ties are broken by ascending node
/// ID, so the result is stable across runs regardless of input order.
///
/// # Errors
///
/// Returns `Err` only when the linearization digest fails to canonicalize.
pub fn linearize<T>(plan: &PartialOrderPlan<T>) -> Result<PlanningDecision<LinearizationResult>, PlanError> {
    let (order, ready_set_sizes, remaining) = run_kahn(&plan.nodes, &plan.edges);

    if !remaining.is_empty() {
        let mut witnesses: Vec<String> = remaining.iter().map(ToString::to_string).collect();
        witnesses.sort();
        witnesses.truncate(5);
        return Ok(PlanningDecision::error(
            "cycle_detected",
            format!("cycle detected among nodes: {}", witnesses.join(", ")),
        ));
    }

    let order_strings: Vec<String> = order.iter().map(ToString::to_string).collect();
    let linearization_digest = content_hash(&LinearizationIdentity {
        schema_version: plan.schema_version,
        node_ids: &order_strings,
    })?;

    Ok(PlanningDecision::ok(LinearizationResult { order, ready_set_sizes, linearization_digest }))
}
