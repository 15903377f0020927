// crates/mc-planner-acquisition/src/candidates.rs
// ============================================================================
// Module: Candidate Enumeration
// Description: Enumerates viable acquisition candidates per strategy from
//              static tables plus runtime observations.
// Dependencies: crate::crafting, crate::types, mc-planner-core::canon
// ============================================================================

//! ## Overview
//! Each strategy's gating rule is independent: `mine`/`craft` require an
//! injected [`crate::crafting::CraftingSubsolver`] and are gated out
//! before ranking when none is supplied (fail-closed); `trade`
//! and `loot` require a matching nearby-entity observation; `salvage`
//! requires a static salvage-source entry whose source item is on hand.
//! No candidate ever carries a fabricated context token.

use std::collections::HashMap;

use mc_planner_core::canon::ContentHash;
use mc_planner_core::canon::content_hash;

use crate::crafting::CraftingSubsolver;
use crate::error::AcquisitionError;
use crate::types::AcquisitionCandidate;
use crate::types::AcquisitionStrategy;
use crate::types::NearbyBlock;
use crate::types::NearbyEntity;

const MINE_BASE_COST: f64 = 3.0;
const CRAFT_BASE_COST: f64 = 2.0;
const TRADE_BASE_COST: f64 = 4.0;
const LOOT_BASE_COST: f64 = 5.0;
const SALVAGE_BASE_COST: f64 = 1.5;

/// Static `(item, source item)` salvage table: breaking down `source` yields
/// `item`. Sorted by item for clarity; searched linearly since the table is
/// small and fixed.
const SALVAGE_SOURCES: &[(&str, &str)] = &[("stick", "oak_planks"), ("paper", "sugar_cane")];

/// Enumerates every viable candidate for acquiring `item`, given the current
/// inventory and observations. `crafting` gates `mine`/`craft` out entirely
/// when absent.
#[must_use]
pub fn enumerate_candidates<C: CraftingSubsolver>(
    item: &str,
    inventory: &HashMap<String, u64>,
    nearby_blocks: &[NearbyBlock],
    nearby_entities: &[NearbyEntity],
    crafting: Option<&C>,
) -> Vec<AcquisitionCandidate> {
    let mut candidates = Vec::new();

    if let Some(crafting) = crafting {
        if let Some(block_type) = crafting.mining_block_for(item)
            && nearby_blocks.iter().any(|b| b.block_type == block_type)
        {
            candidates.push(AcquisitionCandidate {
                strategy: AcquisitionStrategy::Mine,
                base_cost: MINE_BASE_COST,
                context_token: None,
            });
        }
        if crafting.has_recipe(item) {
            candidates.push(AcquisitionCandidate {
                strategy: AcquisitionStrategy::Craft,
                base_cost: CRAFT_BASE_COST,
                context_token: None,
            });
        }
    }

    if nearby_entities.iter().any(|e| e.entity_type == "villager") {
        candidates.push(AcquisitionCandidate {
            strategy: AcquisitionStrategy::Trade,
            base_cost: TRADE_BASE_COST,
            context_token: Some("proximity:villager".to_string()),
        });
    }

    if let Some(container) = nearby_entities.iter().find_map(|e| e.entity_type.strip_prefix("container:")) {
        candidates.push(AcquisitionCandidate {
            strategy: AcquisitionStrategy::Loot,
            base_cost: LOOT_BASE_COST,
            context_token: Some(format!("proximity:container:{container}")),
        });
    }

    if let Some((_, source)) = SALVAGE_SOURCES.iter().find(|(target, _)| *target == item)
        && inventory.get(*source).copied().unwrap_or(0) > 0
    {
        candidates.push(AcquisitionCandidate {
            strategy: AcquisitionStrategy::Salvage,
            base_cost: SALVAGE_BASE_COST,
            context_token: None,
        });
    }

    candidates
}

/// Computes the content hash over the sorted strategy-tag multiset (spec
/// §4.D step 2).
///
/// # Errors
///
/// Returns [`AcquisitionError`] when the tag list fails to canonicalize.
pub fn candidate_set_digest(candidates: &[AcquisitionCandidate]) -> Result<ContentHash, AcquisitionError> {
    let mut tags: Vec<&str> = candidates.iter().map(|c| c.strategy.tag()).collect();
    tags.sort_unstable();
    Ok(content_hash(&tags)?)
}
