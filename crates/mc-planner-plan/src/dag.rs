// crates/mc-planner-plan/src/dag.rs
// ============================================================================
// Module: DAG Construction
// Description: Builds a partial-order plan from module declarations and
//              their steps.
// Dependencies: crate::types, mc-planner-core::canon
// ============================================================================

//! ## Overview
//! `build_dag_from_modules` is the sole entry point that produces a
//! [`PartialOrderPlan`]. It never panics on malformed input: bound
//! violations and cycles are reported through the
//! [`PlanningDecision`] envelope.

use std::collections::BTreeSet;
use std::collections::HashMap;

use mc_planner_core::canon::ContentHash;
use mc_planner_core::canon::content_hash;
use serde::Serialize;

use crate::error::PlanError;
use crate::types::EdgeConstraint;
use crate::types::MAX_DAG_NODES;
use crate::types::PartialOrderPlan;
use crate::types::PlanEdge;
use crate::types::PlanNode;
use crate::types::PlanningDecision;

/// Module types that receive a shared conflict key `"type:<module_type>"`.
/// Any other module type carries no default conflict key.
const CONFLICTING_MODULE_TYPES: &[&str] = &["place_feature", "scaffold"];

/// A module declaration: its identity, type, and the other modules that
/// must precede it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    /// Stable module identifier, unique within one solve.
    pub module_id: String,
    /// The module's type tag (drives default conflict-key assignment).
    pub module_type: String,
    /// Module IDs that must transitively precede this module.
    pub depends_on: Vec<String>,
}

#[derive(Serialize)]
struct NodeIdentity<'a> {
    schema_version: u32,
    module_id: &'a str,
    module_type: &'a str,
}

#[derive(Serialize)]
struct PlanIdentity<'a> {
    schema_version: u32,
    node_ids: &'a [String],
    edges: &'a [String],
}

fn node_id(schema_version: u32, module_id: &str, module_type: &str) -> Result<ContentHash, PlanError> {
    Ok(content_hash(&NodeIdentity { schema_version, module_id, module_type })?)
}

fn conflict_keys_for(module_type: &str) -> BTreeSet<String> {
    if CONFLICTING_MODULE_TYPES.contains(&module_type) {
        BTreeSet::from([format!("type:{module_type}")])
    } else {
        BTreeSet::new()
    }
}

/// Builds a [`PartialOrderPlan`] from module declarations and their paired
/// steps (same length, same order — `steps[i]` is the payload for
/// `modules[i]`).
///
/// # Errors
///
/// Returns `Err` only when an identity or digest input fails to
/// canonicalize; this is an unrecoverable contract violation, distinct from
/// the `Blocked`/`Error` planning outcomes returned inside the `Ok` value.
pub fn build_dag_from_modules<T: Serialize + Clone>(
    schema_version: u32,
    modules: &[ModuleDecl],
    steps: &[T],
) -> Result<PlanningDecision<PartialOrderPlan<T>>, PlanError> {
    if steps.len() > MAX_DAG_NODES {
        return Ok(PlanningDecision::blocked(
            "bound_exceeded",
            format!("plan has {} steps, exceeding the cap of {MAX_DAG_NODES}", steps.len()),
        ));
    }
    if modules.len() != steps.len() {
        return Err(PlanError::MismatchedLengths { modules: modules.len(), steps: steps.len() });
    }

    let mut ids_by_module: HashMap<&str, ContentHash> = HashMap::with_capacity(modules.len());
    for module in modules {
        let id = node_id(schema_version, &module.module_id, &module.module_type)?;
        ids_by_module.insert(module.module_id.as_str(), id);
    }

    let mut nodes = Vec::with_capacity(modules.len());
    for (module, step) in modules.iter().zip(steps.iter()) {
        nodes.push(PlanNode {
            id: ids_by_module[module.module_id.as_str()].clone(),
            module_id: module.module_id.clone(),
            data: step.clone(),
            conflict_keys: conflict_keys_for(&module.module_type),
        });
    }

    // A `depends_on` entry naming a module absent from this solve produces
    // no structural edge here — that is a semantic gap surfaced later by
    // `check_feasibility` against an explicit `PlanConstraint` list, which
    // may reference modules the DAG never saw.
    let mut edges = Vec::new();
    for module in modules {
        for required in &module.depends_on {
            let Some(required_id) = ids_by_module.get(required.as_str()) else {
                continue;
            };
            edges.push(PlanEdge {
                from: required_id.clone(),
                to: ids_by_module[module.module_id.as_str()].clone(),
                constraint: EdgeConstraint::Dependency,
            });
        }
    }

    if let Some(cycle_ids) = crate::linearize::find_cycle_witness(&nodes, &edges) {
        return Ok(PlanningDecision::error(
            "cycle_detected",
            format!("cycle detected among nodes: {}", cycle_ids.join(", ")),
        ));
    }

    let mut sorted_node_ids: Vec<String> = nodes.iter().map(|n| n.id.as_str().to_string()).collect();
    sorted_node_ids.sort();

    let mut sorted_edges: Vec<String> = edges
        .iter()
        .map(|e| format!("{}→{}:{}", e.from, e.to, edge_constraint_tag(e.constraint)))
        .collect();
    sorted_edges.sort();

    let plan_digest = content_hash(&PlanIdentity {
        schema_version,
        node_ids: &sorted_node_ids,
        edges: &sorted_edges,
    })?;

    Ok(PlanningDecision::ok(PartialOrderPlan { schema_version, nodes, edges, plan_digest }))
}

fn edge_constraint_tag(constraint: EdgeConstraint) -> &'static str {
    match constraint {
        EdgeConstraint::Dependency => "dependency",
        EdgeConstraint::Reachability => "reachability",
        EdgeConstraint::Support => "support",
    }
}
