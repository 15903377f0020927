// crates/mc-planner-acquisition/src/lib.rs
// ============================================================================
// Crate: mc-planner-acquisition
// Description: Rig D — acquisition-strategy candidate enumeration, learned
//              ranking, and dispatch to the crafting subsolver or the
//              external reasoner.
// ============================================================================

//! ## Overview
//! Given an item, a quantity, and the agent's current inventory and nearby
//! observations, this crate enumerates viable acquisition candidates
//! ([`candidates::enumerate_candidates`]) across five strategies — `mine`,
//! `craft`, `trade`, `loot`, `salvage` — ranks them against a learned
//! per-`(item, strategy, contextToken)` prior ([`priors::PriorStore`]), and
//! dispatches the top-ranked candidate ([`dispatch`]). [`solve::solve_acquisition`]
//! is the single entry point.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod candidates;
pub mod crafting;
pub mod dispatch;
pub mod error;
pub mod priors;
pub mod ranking;
pub mod solve;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use candidates::candidate_set_digest;
pub use candidates::enumerate_candidates;
pub use crafting::CraftingSolveResult;
pub use crafting::CraftingSubsolver;
pub use error::AcquisitionError;
pub use priors::EpisodeReportOutcome;
pub use priors::PriorStore;
pub use ranking::rank_candidates;
pub use solve::solve_acquisition;
pub use types::AcquisitionCandidate;
pub use types::AcquisitionOutcome;
pub use types::AcquisitionStrategy;
pub use types::NearbyBlock;
pub use types::NearbyEntity;
pub use types::RankedCandidate;
