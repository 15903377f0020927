// crates/mc-planner-acquisition/src/error.rs
// ============================================================================
// Module: Rig D Errors
// Description: Unrecoverable failures raised by this crate.
// Dependencies: mc-planner-core::canon
// ============================================================================

use mc_planner_core::canon::CanonicalizeError;
use thiserror::Error;

/// Errors raised by this crate that are not modeled as a solve outcome —
/// these are contract violations, not expected planning outcomes.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// A candidate or bundle input failed to canonicalize.
    #[error("failed to canonicalize acquisition data: {0}")]
    Canonicalize(#[from] CanonicalizeError),
}
