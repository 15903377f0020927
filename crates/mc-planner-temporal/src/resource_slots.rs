// crates/mc-planner-temporal/src/resource_slots.rs
// ============================================================================
// Module: P03 Temporal Adapter
// Description: Resource-slot scheduling over discrete time buckets.
// Dependencies: mc-planner-core::canon
// ============================================================================

//! ## Overview
//! Time is discretized into buckets (`currentBucket`, `horizonBucket`,
//! `bucketSizeTicks`). Slots become ready at a bucket and are matched by
//! type; every mutation here returns a new value rather than touching its
//! input, matching the immutability the rest of this crate's modules hold
//! to for audit-replayable state.

use std::collections::HashMap;

use mc_planner_core::canon::ContentHash;
use mc_planner_core::canon::content_hash;
use serde::Deserialize;
use serde::Serialize;

use crate::error::TemporalError;

/// Discrete-time horizon a slot schedule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketWindow {
    /// The bucket "now" is in.
    pub current_bucket: u64,
    /// The furthest bucket a need may be satisfied within.
    pub horizon_bucket: u64,
    /// Tick width of one bucket.
    pub bucket_size_ticks: u64,
}

/// A reservable resource slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSlot {
    /// Slot identifier.
    pub id: String,
    /// Slot type (e.g. `"furnace"`, `"crafting_table"`).
    #[serde(rename = "type")]
    pub slot_type: String,
    /// Bucket this slot becomes ready at.
    pub ready_at_bucket: u64,
}

/// Canonical sort order for slots: `(type asc, readyAtBucket asc, id asc)`.
fn sort_key(slot: &ResourceSlot) -> (&str, u64, &str) {
    (&slot.slot_type, slot.ready_at_bucket, &slot.id)
}

/// Returns `slots` sorted into canonical order. The input is not mutated.
#[must_use]
pub fn canonical_order(slots: &[ResourceSlot]) -> Vec<ResourceSlot> {
    let mut sorted: Vec<ResourceSlot> = slots.to_vec();
    sorted.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    sorted
}

/// Computes the identity hash of a canonicalized slot snapshot.
///
/// # Errors
///
/// Returns [`TemporalError`] when the snapshot fails to canonicalize.
pub fn slots_identity_hash(slots: &[ResourceSlot]) -> Result<ContentHash, TemporalError> {
    Ok(content_hash(&canonical_order(slots))?)
}

/// Finds the slot of `slot_type` with the minimum `readyAtBucket` that is
/// `≤ atBucket + maxWait`, ties broken by ascending `id`. Returns `None`
/// when no such slot exists.
#[must_use]
pub fn find_available_slot<'a>(
    slots: &'a [ResourceSlot],
    slot_type: &str,
    at_bucket: u64,
    max_wait: u64,
) -> Option<&'a ResourceSlot> {
    let deadline = at_bucket.saturating_add(max_wait);
    slots
        .iter()
        .filter(|slot| slot.slot_type == slot_type && slot.ready_at_bucket <= deadline)
        .min_by_key(|slot| (slot.ready_at_bucket, slot.id.clone()))
}

/// Returns a new slot array with `slot_id`'s readiness bumped to
/// `new_ready_at_bucket`. `slots` is not mutated; if `slot_id` is absent the
/// returned array equals the input.
#[must_use]
pub fn reserve_slot(slots: &[ResourceSlot], slot_id: &str, new_ready_at_bucket: u64) -> Vec<ResourceSlot> {
    slots
        .iter()
        .map(|slot| {
            if slot.id == slot_id {
                ResourceSlot { id: slot.id.clone(), slot_type: slot.slot_type.clone(), ready_at_bucket: new_ready_at_bucket }
            } else {
                slot.clone()
            }
        })
        .collect()
}

/// One outstanding resource need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNeed {
    /// Type of slot this need requires.
    #[serde(rename = "type")]
    pub slot_type: String,
    /// Identifier used to report a blocked need.
    pub need_id: String,
}

/// A need that cannot be satisfied within the horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockedNeed {
    /// The need's identifier.
    pub need_id: String,
    /// The slot type that has no slot becoming ready in time.
    pub slot_type: String,
}

/// For each need, reports whether any slot of its type can become ready
/// within `window.horizon_bucket`. Needs with no such slot are returned as
/// deadlocked, in input order.
#[must_use]
pub fn check_deadlock(needs: &[ResourceNeed], slots: &[ResourceSlot], window: BucketWindow) -> Vec<DeadlockedNeed> {
    needs
        .iter()
        .filter(|need| !slots.iter().any(|slot| slot.slot_type == need.slot_type && slot.ready_at_bucket <= window.horizon_bucket))
        .map(|need| DeadlockedNeed { need_id: need.need_id.clone(), slot_type: need.slot_type.clone() })
        .collect()
}

/// A batch-capable operator entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOperator {
    /// Item type this batch operator produces.
    pub item_type: String,
    /// Operator identifier.
    pub operator_id: String,
}

/// Picks the batch operator for `item_type` when `count ≥ threshold` and a
/// matching entry exists in `batch_ops`; otherwise `None`.
#[must_use]
pub fn prefer_batch<'a>(item_type: &str, count: u64, batch_ops: &'a [BatchOperator], threshold: u64) -> Option<&'a BatchOperator> {
    if count < threshold {
        return None;
    }
    batch_ops.iter().find(|op| op.item_type == item_type)
}

/// One scheduled entry contributing to a makespan computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Bucket this entry's work ends at.
    pub end_bucket: u64,
}

/// The makespan of a schedule: the maximum `endBucket` across all entries,
/// or `0` on an empty schedule.
#[must_use]
pub fn compute_makespan(schedule: &[ScheduleEntry]) -> u64 {
    schedule.iter().map(|entry| entry.end_bucket).max().unwrap_or(0)
}

/// An operator's snapshot contribution to a combined slot+operator identity
/// hash, keyed by operator id for deterministic ordering.
#[must_use]
pub fn operator_snapshot_hash(operators: &HashMap<String, ContentHash>) -> Result<ContentHash, TemporalError> {
    let mut sorted: Vec<(&String, &ContentHash)> = operators.iter().collect();
    sorted.sort_by_key(|(id, _)| id.as_str());
    Ok(content_hash(&sorted)?)
}
