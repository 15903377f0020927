// crates/mc-planner-temporal/src/error.rs
// ============================================================================
// Module: Temporal Crate Errors
// Description: Unrecoverable failures raised by P03/P09/P10/P13.
// Dependencies: mc-planner-core::canon
// ============================================================================

use mc_planner_core::canon::CanonicalizeError;
use thiserror::Error;

/// Errors raised by this crate that are not modeled as a planning outcome —
/// contract violations, not expected planning results.
#[derive(Debug, Error)]
pub enum TemporalError {
    /// A value failed to canonicalize while computing an identity hash.
    #[error("failed to canonicalize temporal data: {0}")]
    Canonicalize(#[from] CanonicalizeError),
    /// A stochastic action's outcome masses did not sum to `MASS_TOTAL`.
    #[error("action {action_id} outcome masses sum to {total_ppm} ppm, not MASS_TOTAL")]
    MassNotConserved {
        /// The offending action's id.
        action_id: String,
        /// The sum actually observed.
        total_ppm: u64,
    },
}
