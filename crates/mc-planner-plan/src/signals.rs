// crates/mc-planner-plan/src/signals.rs
// ============================================================================
// Module: Rig G Signals
// Description: Instrumentation summary of one planning pass.
// Dependencies: crate::types
// ============================================================================

use std::collections::BTreeMap;

use crate::types::RigGSignals;
use crate::types::SignalsInput;

/// Computes the round-half-up 95th percentile index: `ceil(0.95 * n) - 1`.
fn p95_index(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let raw = (0.95_f64 * n as f64).ceil() as usize;
    raw.saturating_sub(1).min(n - 1)
}

/// Computes a [`RigGSignals`] record from one planning pass's intermediate
/// results.
#[must_use]
pub fn compute_rig_g_signals(input: &SignalsInput<'_>) -> RigGSignals {
    let sizes = &input.linearization.ready_set_sizes;
    let ready_set_mean = if sizes.is_empty() {
        0.0
    } else {
        sizes.iter().sum::<usize>() as f64 / sizes.len() as f64
    };

    let ready_set_p95 = if sizes.is_empty() {
        0.0
    } else {
        let mut sorted = sizes.clone();
        sorted.sort_unstable();
        sorted[p95_index(sorted.len())] as f64
    };

    let feasibility_passed = input.feasibility.is_none_or(|f| f.passed());

    let mut rejections_by_type: BTreeMap<String, u32> = BTreeMap::new();
    if let Some(feasibility) = input.feasibility {
        for violation in &feasibility.violations {
            *rejections_by_type.entry(violation.reason.clone()).or_insert(0) += 1;
        }
    }

    RigGSignals {
        node_count: input.node_count,
        edge_count: input.edge_count,
        ready_set_mean,
        ready_set_p95,
        commuting_pair_count: input.commuting_pairs.len(),
        feasibility_passed,
        rejections_by_type,
        plan_digest: input.plan_digest.clone(),
        linearization_digest: input.linearization.linearization_digest.clone(),
        degraded_to_raw_steps: input.degraded_to_raw_steps,
    }
}
