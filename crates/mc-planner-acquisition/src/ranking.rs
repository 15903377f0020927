// crates/mc-planner-acquisition/src/ranking.rs
// ============================================================================
// Module: Candidate Ranking
// Description: Orders enumerated candidates by learned prior, then cost,
//              then strategy name.
// Dependencies: crate::priors, crate::types
// ============================================================================

use crate::priors::PriorStore;
use crate::types::AcquisitionCandidate;
use crate::types::RankedCandidate;

/// Ranks `candidates` for `item`: highest learned success rate first, ties
/// broken by ascending base cost, then ascending strategy-name lexicographic
/// order.
#[must_use]
pub fn rank_candidates(item: &str, candidates: &[AcquisitionCandidate], priors: &PriorStore) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|candidate| {
            let (success_rate, sample_count) = priors.get(item, candidate.strategy, candidate.context_token.as_deref());
            RankedCandidate {
                strategy: candidate.strategy,
                base_cost: candidate.base_cost,
                context_token: candidate.context_token.clone(),
                success_rate,
                sample_count,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| a.base_cost.total_cmp(&b.base_cost))
            .then_with(|| a.strategy.tag().cmp(b.strategy.tag()))
    });

    ranked
}
