// crates/mc-planner-plan/src/feasibility.rs
// ============================================================================
// Module: Feasibility Checker
// Description: Validates dependency/support/reachability constraints
//              against a built DAG.
// Dependencies: crate::types
// ============================================================================

//! ## Overview
//! `check_feasibility` evaluates every constraint against the plan and
//! returns the full violation set; [`crate::types::FeasibilityResult::decision`]
//! projects that onto the `ok | blocked` envelope using the first violation
//! by constraint order.

use std::collections::HashMap;
use std::collections::HashSet;

use mc_planner_core::canon::ContentHash;

use crate::types::FeasibilityResult;
use crate::types::FeasibilityViolation;
use crate::types::PartialOrderPlan;
use crate::types::PlanConstraint;

fn descendant_set<T>(plan: &PartialOrderPlan<T>, from: &ContentHash) -> HashSet<ContentHash> {
    let mut adjacency: HashMap<&ContentHash, Vec<&ContentHash>> = HashMap::new();
    for edge in &plan.edges {
        adjacency.entry(&edge.from).or_default().push(&edge.to);
    }

    let mut visited = HashSet::new();
    let mut stack = vec![from.clone()];
    while let Some(current) = stack.pop() {
        if let Some(children) = adjacency.get(&current) {
            for child in children {
                if visited.insert((*child).clone()) {
                    stack.push((*child).clone());
                }
            }
        }
    }
    visited
}

fn node_by_module_id<'a, T>(plan: &'a PartialOrderPlan<T>, module_id: &str) -> Option<&'a ContentHash> {
    plan.nodes.iter().find(|n| n.module_id == module_id).map(|n| &n.id)
}

/// Evaluates every constraint against `plan`, returning the full set of
/// violations found (possibly empty).
#[must_use]
pub fn check_feasibility<T>(plan: &PartialOrderPlan<T>, constraints: &[PlanConstraint]) -> FeasibilityResult {
    let mut violations = Vec::new();

    for (index, constraint) in constraints.iter().enumerate() {
        match constraint {
            PlanConstraint::Dependency { dependent_module_id, required_module_id } => {
                check_precedence_constraint(
                    plan,
                    index,
                    dependent_module_id,
                    required_module_id,
                    "infeasible_dependency",
                    &mut violations,
                );
            }
            PlanConstraint::Support { dependent_module_id, support_module_id } => {
                check_precedence_constraint(
                    plan,
                    index,
                    dependent_module_id,
                    support_module_id,
                    "infeasible_dependency",
                    &mut violations,
                );
            }
            PlanConstraint::Reachability { module_id, max_distance, current_distance } => {
                if let Some(distance) = current_distance
                    && distance > max_distance
                {
                    violations.push(FeasibilityViolation {
                        constraint_index: index,
                        reason: "infeasible_reachability".to_string(),
                        detail: format!(
                            "module \"{module_id}\" is at distance {distance}, exceeding max {max_distance}"
                        ),
                    });
                }
                // `current_distance == None` is treated as unknown and accepted.
            }
        }
    }

    FeasibilityResult { violations }
}

fn check_precedence_constraint<T>(
    plan: &PartialOrderPlan<T>,
    index: usize,
    dependent_module_id: &str,
    required_module_id: &str,
    reason: &str,
    violations: &mut Vec<FeasibilityViolation>,
) {
    let Some(required_id) = node_by_module_id(plan, required_module_id) else {
        violations.push(FeasibilityViolation {
            constraint_index: index,
            reason: reason.to_string(),
            detail: format!("required module \"{required_module_id}\" is not present in the plan"),
        });
        return;
    };
    let Some(dependent_id) = node_by_module_id(plan, dependent_module_id) else {
        violations.push(FeasibilityViolation {
            constraint_index: index,
            reason: reason.to_string(),
            detail: format!("dependent module \"{dependent_module_id}\" is not present in the plan"),
        });
        return;
    };

    let descendants = descendant_set(plan, required_id);
    if !descendants.contains(dependent_id) {
        violations.push(FeasibilityViolation {
            constraint_index: index,
            reason: reason.to_string(),
            detail: format!(
                "\"{required_module_id}\" does not transitively precede \"{dependent_module_id}\""
            ),
        });
    }
}
