// crates/mc-planner-acquisition/src/crafting.rs
// ============================================================================
// Module: Crafting Subsolver Interface
// Description: Capability interface to the item/recipe catalog and crafting
//              search, injected rather than owned by this crate.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The item/recipe catalog is an embedding-environment concern this crate
//! is not responsible for, so it never owns one. `CraftingSubsolver` is the
//! capability seam `mine`/`craft` candidates are gated and dispatched
//! through: an injected capability is handed a request object it alone
//! knows how to fulfill. A caller with no subsolver to inject passes
//! `None`, and `mine`/`craft` are gated out before ranking — fail-closed,
//! never a panic on absent data.

use std::collections::HashMap;

/// Result of a crafting-subsolver dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftingSolveResult {
    /// Whether the subsolver found a path to the item.
    pub solved: bool,
    /// The ordered action names of the solution, if found.
    pub steps: Vec<String>,
}

/// Capability interface to the crafting subsolver and its backing item/recipe
/// catalog.
pub trait CraftingSubsolver {
    /// Returns the block type that yields `item` when mined, if the catalog
    /// declares one.
    fn mining_block_for(&self, item: &str) -> Option<String>;

    /// Returns whether the catalog declares a recipe for `item`.
    fn has_recipe(&self, item: &str) -> bool;

    /// Solves for `quantity` of `item` via the given strategy's approach
    /// (mining or crafting), given the current inventory.
    fn solve(&self, item: &str, quantity: u64, inventory: &HashMap<String, u64>) -> CraftingSolveResult;
}
