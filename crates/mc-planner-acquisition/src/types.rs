// crates/mc-planner-acquisition/src/types.rs
// ============================================================================
// Module: Rig D Data Model
// Description: Strategies, candidates, observations, and the solve outcome.
// Dependencies: mc-planner-core::canon
// ============================================================================

//! ## Overview
//! The acquisition solver's own data types. A candidate is a ranked option
//! for obtaining one item; the solve outcome mirrors the parent/child bundle
//! composition of the acquisition solve.

use mc_planner_core::bundle::SolveBundle;
use serde::Deserialize;
use serde::Serialize;

/// A resource-acquisition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionStrategy {
    /// Break a block to obtain the item.
    Mine,
    /// Craft the item from a known recipe.
    Craft,
    /// Trade with a nearby villager.
    Trade,
    /// Loot the item from a nearby container.
    Loot,
    /// Break down an owned item into the target item.
    Salvage,
}

impl AcquisitionStrategy {
    /// Returns the strategy's wire tag, used for digests and tie-breaks.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Mine => "mine",
            Self::Craft => "craft",
            Self::Trade => "trade",
            Self::Loot => "loot",
            Self::Salvage => "salvage",
        }
    }
}

/// A block observed near the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyBlock {
    /// Block type identifier (e.g. `"iron_ore"`).
    pub block_type: String,
    /// Distance from the agent, in blocks.
    pub distance: f64,
}

/// An entity observed near the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyEntity {
    /// Entity type identifier (e.g. `"villager"`, `"container:chest"`).
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Distance from the agent, in blocks.
    pub distance: f64,
}

/// One enumerated acquisition candidate, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionCandidate {
    /// The strategy this candidate pursues.
    pub strategy: AcquisitionStrategy,
    /// Estimated base cost, used as the first ranking tie-break.
    pub base_cost: f64,
    /// Observation-derived context token this candidate depends on, if any.
    /// Only present when the corresponding observation was actually seen —
    /// never fabricated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_token: Option<String>,
}

/// A candidate after ranking, carrying the prior statistics it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// The strategy this candidate pursues.
    pub strategy: AcquisitionStrategy,
    /// Estimated base cost.
    pub base_cost: f64,
    /// Context token this candidate depends on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_token: Option<String>,
    /// Learned success rate from the prior store (neutral default when
    /// unobserved).
    pub success_rate: f64,
    /// Number of episodes the prior was built from.
    pub sample_count: u32,
}

/// The full result of one `solve_acquisition` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionOutcome {
    /// Whether a candidate was dispatched and it reported a solution.
    pub solved: bool,
    /// The strategy ultimately dispatched, if any candidate was viable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_strategy: Option<AcquisitionStrategy>,
    /// Every candidate considered, in ranked order.
    pub strategy_ranking: Vec<RankedCandidate>,
    /// The parent bundle, followed by zero or more child bundles (one per
    /// dispatched sub-solve). `parent_bundle_id == bundles[0].bundle_id`.
    pub bundles: Vec<SolveBundle>,
    /// Error detail, present only when `solved` is `false` and no candidate
    /// was viable (`"No viable ..."`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
