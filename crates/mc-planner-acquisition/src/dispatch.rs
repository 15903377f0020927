// crates/mc-planner-acquisition/src/dispatch.rs
// ============================================================================
// Module: Candidate Dispatch
// Description: Dispatches the top-ranked candidate to its delegate
//              (crafting subsolver or external reasoner) and builds the
//              child solve bundle.
// Dependencies: crate::crafting, crate::types, mc-planner-core
// ============================================================================

//! ## Overview
//! `mine`/`craft` delegate to the injected [`crate::crafting::CraftingSubsolver`];
//! `trade`/`loot`/`salvage` construct a rule set and delegate to the external
//! reasoner over [`mc_planner_core::interfaces::ReasonerClient`]. Either path
//! injects the candidate's context token into the child solve's wire
//! inventory and reports `contextTokensInjected` and `initialStateHash`
//! consistently with the augmented inventory — never a fabricated token.

use std::collections::HashMap;

use mc_planner_core::bundle::SearchStats;
use mc_planner_core::bundle::SolveBundle;
use mc_planner_core::bundle::compat_report;
use mc_planner_core::bundle::compute_bundle_input;
use mc_planner_core::bundle::compute_bundle_output;
use mc_planner_core::bundle::create_solve_bundle;
use mc_planner_core::canon::Step;
use mc_planner_core::interfaces::ReasonerClient;
use mc_planner_core::interfaces::SolveCommand;
use mc_planner_core::interfaces::SolvePayload;
use mc_planner_core::interfaces::solve_or_unavailable;
use mc_planner_core::interfaces::SolveOutcome;
use mc_planner_core::time::Timestamp;

use crate::crafting::CraftingSubsolver;
use crate::error::AcquisitionError;
use crate::types::AcquisitionStrategy;

const CONTRACT_VERSION: &str = "1.0.0";
const CODE_VERSION: &str = "mc-planner-acquisition-0.1.0";
const MAX_NODES: u64 = 1_000;

/// Builds the augmented wire inventory for a child solve: the caller's
/// inventory plus exactly one unit of `context_token`, when present.
fn augmented_inventory(inventory: &HashMap<String, u64>, context_token: Option<&str>) -> HashMap<String, u64> {
    let mut augmented = inventory.clone();
    if let Some(token) = context_token {
        augmented.insert(token.to_string(), 1);
    }
    augmented
}

/// Dispatches a `mine`/`craft` candidate to the injected crafting subsolver.
///
/// # Errors
///
/// Returns [`AcquisitionError`] when the child bundle fails to canonicalize.
pub fn dispatch_to_crafting<C: CraftingSubsolver>(
    crafting: &C,
    item: &str,
    quantity: u64,
    strategy: AcquisitionStrategy,
    inventory: &HashMap<String, u64>,
    context_token: Option<&str>,
    timestamp: Timestamp,
) -> Result<(SolveBundle, bool), AcquisitionError> {
    let wire_inventory = augmented_inventory(inventory, context_token);
    let result = crafting.solve(item, quantity, &wire_inventory);
    let steps: Vec<Step> = result.steps.iter().map(|action| Step { action: action.clone(), extra: Default::default() }).collect();

    let bundle = build_child_bundle(
        strategy,
        item,
        quantity,
        &wire_inventory,
        context_token,
        result.solved,
        &steps,
        SearchStats { total_nodes: steps.len() as u64, duration_ms: 0, solution_path_length: result.solved.then_some(steps.len() as u64) },
        timestamp,
    )?;
    Ok((bundle, result.solved))
}

/// Dispatches a `trade`/`loot`/`salvage` candidate to the external reasoner.
///
/// # Errors
///
/// Returns [`AcquisitionError`] when the child bundle fails to canonicalize.
pub fn dispatch_to_reasoner<R: ReasonerClient>(
    reasoner: &R,
    item: &str,
    quantity: u64,
    strategy: AcquisitionStrategy,
    inventory: &HashMap<String, u64>,
    context_token: Option<&str>,
    timestamp: Timestamp,
) -> Result<(SolveBundle, bool), AcquisitionError> {
    let wire_inventory = augmented_inventory(inventory, context_token);
    let payload = SolvePayload {
        command: SolveCommand::Solve,
        domain: "minecraft".to_string(),
        contract_version: CONTRACT_VERSION.to_string(),
        execution_mode: None,
        solver_id: format!("minecraft.acquisition.{}", strategy.tag()),
        inventory: wire_inventory.clone(),
        goal: serde_json::json!({"item": item, "quantity": quantity}),
        nearby_blocks: serde_json::json!([]),
        rules: serde_json::json!({"strategy": strategy.tag(), "item": item, "quantity": quantity}),
        max_nodes: MAX_NODES,
        use_learning: true,
    };

    let (solved, steps) = match solve_or_unavailable(reasoner, &payload) {
        SolveOutcome::Responded(result) => (result.solution_found, result.solution_path),
        SolveOutcome::Unavailable(_) => (false, Vec::new()),
    };

    let search_stats = SearchStats { total_nodes: steps.len() as u64, duration_ms: 0, solution_path_length: solved.then_some(steps.len() as u64) };
    let bundle = build_child_bundle(strategy, item, quantity, &wire_inventory, context_token, solved, &steps, search_stats, timestamp)?;
    Ok((bundle, solved))
}

#[allow(clippy::too_many_arguments, reason = "mirrors the child SolveBundle construction pipeline one-to-one")]
fn build_child_bundle(
    strategy: AcquisitionStrategy,
    item: &str,
    quantity: u64,
    wire_inventory: &HashMap<String, u64>,
    context_token: Option<&str>,
    solved: bool,
    steps: &[Step],
    search_stats: SearchStats,
    timestamp: Timestamp,
) -> Result<SolveBundle, AcquisitionError> {
    let input = compute_bundle_input(
        format!("minecraft.acquisition.{}", strategy.tag()),
        None,
        CONTRACT_VERSION,
        &[],
        wire_inventory,
        &serde_json::json!({"item": item, "quantity": quantity}),
        &serde_json::json!([]),
        CODE_VERSION,
        None,
        None,
        serde_json::json!({}),
        context_token.map(|t| vec![t.to_string()]),
    )?;
    let output = compute_bundle_output(None, solved, steps, search_stats, None, None)?;
    let compat = compat_report(vec![], 0, timestamp);
    Ok(create_solve_bundle(input, output, compat, timestamp)?)
}
