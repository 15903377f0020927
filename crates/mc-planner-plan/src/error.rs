// crates/mc-planner-plan/src/error.rs
// ============================================================================
// Module: Rig G Errors
// Description: Unrecoverable failures raised by this crate.
// Dependencies: mc-planner-core::canon, thiserror
// ============================================================================

use mc_planner_core::canon::CanonicalizeError;
use thiserror::Error;

/// Errors raised by this crate that are not modeled as a
/// [`crate::types::PlanningDecision`] value — these are contract violations,
/// not expected planning outcomes.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A node or digest input failed to canonicalize.
    #[error("failed to canonicalize plan data: {0}")]
    Canonicalize(#[from] CanonicalizeError),
    /// The caller passed `modules` and `steps` slices of different lengths;
    /// this is a contract violation, not a planning outcome.
    #[error("modules ({modules}) and steps ({steps}) must have the same length")]
    MismatchedLengths {
        /// Length of the `modules` slice.
        modules: usize,
        /// Length of the `steps` slice.
        steps: usize,
    },
}
