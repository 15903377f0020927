// crates/mc-planner-acquisition/src/solve.rs
// ============================================================================
// Module: Acquisition Orchestration
// Description: Top-level enumerate → rank → dispatch pipeline for Rig D.
// Dependencies: crate::candidates, crate::ranking, crate::dispatch,
//               crate::priors, crate::crafting, mc-planner-core
// ============================================================================

//! ## Overview
//! [`solve_acquisition`] is the single entry point for this crate: it
//! enumerates candidates, computes their digest, ranks them against learned
//! priors, and dispatches the top-ranked candidate. A parent [`SolveBundle`]
//! is always produced — even when no candidate is viable — so
//! `bundles[0].bundle_id` is always the audit anchor for the attempt.

use std::collections::HashMap;

use mc_planner_core::bundle::SearchStats;
use mc_planner_core::bundle::SolveBundle;
use mc_planner_core::bundle::compat_report;
use mc_planner_core::bundle::compute_bundle_input;
use mc_planner_core::bundle::compute_bundle_output;
use mc_planner_core::bundle::create_solve_bundle;
use mc_planner_core::interfaces::ReasonerClient;
use mc_planner_core::time::Timestamp;

use crate::candidates::candidate_set_digest;
use crate::candidates::enumerate_candidates;
use crate::crafting::CraftingSubsolver;
use crate::dispatch::dispatch_to_crafting;
use crate::dispatch::dispatch_to_reasoner;
use crate::error::AcquisitionError;
use crate::priors::PriorStore;
use crate::ranking::rank_candidates;
use crate::types::AcquisitionOutcome;
use crate::types::AcquisitionStrategy;
use crate::types::NearbyBlock;
use crate::types::NearbyEntity;

const PARENT_SOLVER_ID: &str = "minecraft.acquisition";
const CONTRACT_VERSION: &str = "1.0.0";
const CODE_VERSION: &str = "mc-planner-acquisition-0.1.0";

/// Solves for `quantity` of `item`, given the current inventory and nearby
/// observations. Returns `Ok` even on a failed or non-viable attempt —
/// failure is reported through [`AcquisitionOutcome::solved`] and
/// [`AcquisitionOutcome::error`], never this function's `Err` path, which is
/// reserved for canonicalization failure while building the audit record.
///
/// # Errors
///
/// Returns [`AcquisitionError`] when a bundle fails to canonicalize.
pub fn solve_acquisition<R: ReasonerClient, C: CraftingSubsolver>(
    item: &str,
    quantity: u64,
    inventory: &HashMap<String, u64>,
    nearby_blocks: &[NearbyBlock],
    nearby_entities: &[NearbyEntity],
    priors: &PriorStore,
    reasoner: &R,
    crafting: Option<&C>,
    timestamp: Timestamp,
) -> Result<AcquisitionOutcome, AcquisitionError> {
    let candidates = enumerate_candidates(item, inventory, nearby_blocks, nearby_entities, crafting);
    let digest = candidate_set_digest(&candidates)?;
    let ranking = rank_candidates(item, &candidates, priors);

    let parent = build_parent_bundle(item, quantity, inventory, nearby_blocks, nearby_entities, &digest, timestamp)?;

    let Some(top) = ranking.first() else {
        return Ok(AcquisitionOutcome {
            solved: false,
            selected_strategy: None,
            strategy_ranking: ranking,
            bundles: vec![parent],
            error: Some(format!("No viable acquisition strategy for \"{item}\"")),
        });
    };

    let (child, solved) = match (top.strategy, crafting) {
        (AcquisitionStrategy::Mine | AcquisitionStrategy::Craft, Some(crafting)) => {
            dispatch_to_crafting(crafting, item, quantity, top.strategy, inventory, top.context_token.as_deref(), timestamp)?
        }
        (AcquisitionStrategy::Trade | AcquisitionStrategy::Loot | AcquisitionStrategy::Salvage, _) => {
            dispatch_to_reasoner(reasoner, item, quantity, top.strategy, inventory, top.context_token.as_deref(), timestamp)?
        }
        (AcquisitionStrategy::Mine | AcquisitionStrategy::Craft, None) => {
            // enumerate_candidates never emits Mine/Craft without a crafting
            // subsolver present, so ranking never surfaces one here either.
            return Ok(AcquisitionOutcome {
                solved: false,
                selected_strategy: None,
                strategy_ranking: ranking,
                bundles: vec![parent],
                error: Some(format!("No viable acquisition strategy for \"{item}\"")),
            });
        }
    };

    Ok(AcquisitionOutcome {
        solved,
        selected_strategy: Some(top.strategy),
        strategy_ranking: ranking,
        bundles: vec![parent, child],
        error: None,
    })
}

fn build_parent_bundle(
    item: &str,
    quantity: u64,
    inventory: &HashMap<String, u64>,
    nearby_blocks: &[NearbyBlock],
    nearby_entities: &[NearbyEntity],
    candidate_digest: &mc_planner_core::canon::ContentHash,
    timestamp: Timestamp,
) -> Result<SolveBundle, AcquisitionError> {
    let nearby_value = serde_json::json!({
        "blocks": nearby_blocks,
        "entities": nearby_entities,
        "candidate_set_digest": candidate_digest.to_string(),
    });
    let input = compute_bundle_input(
        PARENT_SOLVER_ID,
        None,
        CONTRACT_VERSION,
        &[],
        inventory,
        &serde_json::json!({"item": item, "quantity": quantity}),
        &nearby_value,
        CODE_VERSION,
        None,
        None,
        serde_json::json!({}),
        None,
    )?;
    let output = compute_bundle_output(None, false, &[], SearchStats { total_nodes: 0, duration_ms: 0, solution_path_length: None }, None, None)?;
    let compat = compat_report(vec![], 0, timestamp);
    Ok(create_solve_bundle(input, output, compat, timestamp)?)
}
