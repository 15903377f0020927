// crates/mc-planner-plan/src/advisor.rs
// ============================================================================
// Module: Execution Advisor
// Description: Gates plan proceed/replan decisions, fail-closed on unknown
//              metadata versions.
// Dependencies: crate::types
// ============================================================================

//! ## Overview
//! `advise_execution` is the final gate between a planning pass and
//! execution. It fails closed: an unrecognized metadata version or a failed
//! feasibility check always blocks and advises a replan.

use crate::types::AdvisorMeta;
use crate::types::CURRENT_VERSION;
use crate::types::ExecutionAdvice;

/// Clamps `value` into `[1, 3]` after flooring, the suggested-parallelism
/// rule.
fn clamp_parallelism(ready_set_size_mean: f64) -> u32 {
    let floored = ready_set_size_mean.floor();
    if floored < 1.0 {
        1
    } else if floored > 3.0 {
        3
    } else {
        #[allow(clippy::cast_possible_truncation, reason = "floored is verified to lie in [1.0, 3.0]")]
        let parallelism = floored as u32;
        parallelism
    }
}

/// Produces an [`ExecutionAdvice`] for one planning pass.
#[must_use]
pub fn advise_execution(meta: &AdvisorMeta<'_>) -> ExecutionAdvice {
    if meta.version != CURRENT_VERSION {
        return ExecutionAdvice {
            should_proceed: false,
            block_reason: Some(format!(
                "Unknown rigG metadata version: {} (expected {CURRENT_VERSION})",
                meta.version
            )),
            suggested_parallelism: 1,
            reorderable_step_pairs: Vec::new(),
            should_replan: true,
            replan_reason: Some("metadata version mismatch".to_string()),
        };
    }

    if !meta.signals.feasibility_passed {
        let mut reasons: Vec<&str> = meta.signals.rejections_by_type.keys().map(String::as_str).collect();
        reasons.sort_unstable();
        let reason = reasons.join(", ");
        return ExecutionAdvice {
            should_proceed: false,
            block_reason: Some(reason.clone()),
            suggested_parallelism: 1,
            reorderable_step_pairs: Vec::new(),
            should_replan: true,
            replan_reason: Some(reason),
        };
    }

    ExecutionAdvice {
        should_proceed: true,
        block_reason: None,
        suggested_parallelism: clamp_parallelism(meta.signals.ready_set_mean),
        reorderable_step_pairs: meta.commuting_pairs.to_vec(),
        should_replan: false,
        replan_reason: None,
    }
}
