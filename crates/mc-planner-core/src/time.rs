// crates/mc-planner-core/src/time.rs
// ============================================================================
// Module: Planning Core Time Model
// Description: Canonical timestamp representation used in audit records.
// Purpose: Keep solve bundles and signals replayable without reading wall-clock time.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time directly. Every audit record (solve
//! bundles, compat reports, bucket selection traces) carries an explicit
//! timestamp supplied by the caller, so replays and tests are deterministic.

use serde::Deserialize;
use serde::Serialize;

/// Milliseconds since the Unix epoch, supplied by the caller.
///
/// # Invariants
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp from Unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(value: i64) -> Self {
        Self(value)
    }

    /// Returns the timestamp as Unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }
}
