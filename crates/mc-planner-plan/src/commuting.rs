// crates/mc-planner-plan/src/commuting.rs
// ============================================================================
// Module: Commuting-Pair Detection
// Description: Finds node pairs with no precedence path and no shared
//              conflict key.
// Dependencies: crate::types
// ============================================================================

//! ## Overview
//! Reachability is computed once, as sets of descendant IDs per node,
//! rather than repeated per-query traversals.

use std::collections::HashMap;
use std::collections::HashSet;

use mc_planner_core::canon::ContentHash;

use crate::types::CommutingPair;
use crate::types::PartialOrderPlan;

fn build_adjacency<T>(plan: &PartialOrderPlan<T>) -> HashMap<ContentHash, Vec<ContentHash>> {
    let mut adjacency: HashMap<ContentHash, Vec<ContentHash>> =
        plan.nodes.iter().map(|n| (n.id.clone(), Vec::new())).collect();
    for edge in &plan.edges {
        adjacency.entry(edge.from.clone()).or_default().push(edge.to.clone());
    }
    adjacency
}

/// Computes, for every node, the full set of descendant node IDs reachable
/// via precedence edges. Assumes `plan` is acyclic (callers only invoke this
/// on a plan that already passed the builder's cycle check).
fn descendant_sets<T>(plan: &PartialOrderPlan<T>) -> HashMap<ContentHash, HashSet<ContentHash>> {
    let adjacency = build_adjacency(plan);
    let mut memo: HashMap<ContentHash, HashSet<ContentHash>> = HashMap::new();

    fn visit(
        id: &ContentHash,
        adjacency: &HashMap<ContentHash, Vec<ContentHash>>,
        memo: &mut HashMap<ContentHash, HashSet<ContentHash>>,
        visiting: &mut HashSet<ContentHash>,
    ) {
        if memo.contains_key(id) || visiting.contains(id) {
            return;
        }
        visiting.insert(id.clone());
        let mut descendants = HashSet::new();
        if let Some(children) = adjacency.get(id) {
            for child in children {
                visit(child, adjacency, memo, visiting);
                descendants.insert(child.clone());
                if let Some(child_descendants) = memo.get(child) {
                    descendants.extend(child_descendants.iter().cloned());
                }
            }
        }
        visiting.remove(id);
        memo.insert(id.clone(), descendants);
    }

    let mut visiting = HashSet::new();
    for id in adjacency.keys() {
        visit(id, &adjacency, &mut memo, &mut visiting);
    }
    memo
}

/// Finds every unordered pair of nodes with no directed path between them
/// (in either direction) and disjoint `conflict_keys`.
#[must_use]
pub fn find_commuting_pairs<T>(plan: &PartialOrderPlan<T>) -> Vec<CommutingPair> {
    let descendants = descendant_sets(plan);
    let mut pairs = Vec::new();

    for (i, node_a) in plan.nodes.iter().enumerate() {
        for node_b in &plan.nodes[i + 1..] {
            let a_reaches_b = descendants.get(&node_a.id).is_some_and(|d| d.contains(&node_b.id));
            let b_reaches_a = descendants.get(&node_b.id).is_some_and(|d| d.contains(&node_a.id));
            if a_reaches_b || b_reaches_a {
                continue;
            }
            if !node_a.conflict_keys.is_disjoint(&node_b.conflict_keys) {
                continue;
            }
            pairs.push(CommutingPair { node_a: node_a.id.clone(), node_b: node_b.id.clone() });
        }
    }

    pairs
}
