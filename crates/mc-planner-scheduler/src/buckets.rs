// crates/mc-planner-scheduler/src/buckets.rs
// ============================================================================
// Module: Task-Timeframe Buckets
// Description: Named duration buckets and the selection algorithm that
//              assigns a task to one.
// Dependencies: mc-planner-core::time
// ============================================================================

//! ## Overview
//! Five default buckets span tactical reactions through multi-hour
//! expeditions. Selection prefers the shortest bucket that fits the
//! estimate, falls back to the longest bucket when nothing fits, and
//! escalates once for complex or heavily-dependent work — every step is
//! recorded in a [`BucketSelectionTrace`] for audit.

use mc_planner_core::time::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::error::SchedulerError;

/// A named scheduling bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket name.
    pub name: String,
    /// Maximum duration a task may run in this bucket, in milliseconds.
    pub max_duration_ms: u64,
    /// Selection priority; lower values are tried first on ties.
    pub priority: u32,
}

/// Returns the five default buckets, in ascending duration order:
/// `tactical (30s, 5)`, `short (5m, 4)`, `standard (30m, 3)`,
/// `long (2h, 2)`, `expedition (8h, 1)`.
#[must_use]
pub fn default_buckets() -> Vec<Bucket> {
    vec![
        Bucket { name: "tactical".to_string(), max_duration_ms: 30_000, priority: 5 },
        Bucket { name: "short".to_string(), max_duration_ms: 5 * 60_000, priority: 4 },
        Bucket { name: "standard".to_string(), max_duration_ms: 30 * 60_000, priority: 3 },
        Bucket { name: "long".to_string(), max_duration_ms: 2 * 60 * 60_000, priority: 2 },
        Bucket { name: "expedition".to_string(), max_duration_ms: 8 * 60 * 60_000, priority: 1 },
    ]
}

/// Bucket constraints a caller may attach to a selection request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketConstraints {
    /// When set, this bucket is used unconditionally.
    #[serde(default)]
    pub required_bucket: Option<String>,
    /// Buckets removed from consideration before fit selection.
    #[serde(default)]
    pub excluded_buckets: Vec<String>,
}

/// A request to place one task into a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSelectionRequest {
    /// The task's estimated runtime, in milliseconds.
    pub estimated_duration_ms: u64,
    /// The task's priority (informational; selection is duration-driven).
    pub priority: u32,
    /// Complexity in `[0.0, 1.0]`; high complexity biases toward longer
    /// buckets.
    pub complexity: f64,
    /// Resource requirement tags, informational.
    pub resource_requirements: Vec<String>,
    /// Ids of tasks this one depends on; a long dependency chain biases
    /// toward longer buckets.
    pub dependencies: Vec<String>,
    /// Optional constraints narrowing or pinning bucket choice.
    pub constraints: Option<BucketConstraints>,
}

/// The recorded reasoning behind one bucket-selection decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSelectionTrace {
    /// The task this selection was made for.
    pub task_id: String,
    /// The bucket ultimately selected.
    pub selected_bucket: String,
    /// Ordered, human-readable reasoning steps.
    pub reasoning: Vec<String>,
    /// When this selection was made.
    pub timestamp: Timestamp,
}

/// Complexity at or above this threshold biases selection toward the next
/// longer bucket.
const COMPLEXITY_ESCALATION_THRESHOLD: f64 = 0.7;
/// A dependency chain at or above this length biases selection toward the
/// next longer bucket.
const DEPENDENCY_ESCALATION_THRESHOLD: usize = 3;

/// Selects a bucket for `request`, recording every decision step taken.
///
/// # Errors
///
/// Returns [`SchedulerError::UnknownBucket`] when a required bucket is not
/// among `buckets`, and [`SchedulerError::NoBucketsAvailable`] when
/// exclusions remove every configured bucket.
pub fn select_bucket(task_id: &str, request: &BucketSelectionRequest, buckets: &[Bucket], timestamp: Timestamp) -> Result<BucketSelectionTrace, SchedulerError> {
    let mut reasoning = Vec::new();

    if let Some(constraints) = &request.constraints {
        if let Some(required) = &constraints.required_bucket {
            if !buckets.iter().any(|b| &b.name == required) {
                return Err(SchedulerError::UnknownBucket(required.clone()));
            }
            reasoning.push(format!("Required bucket constraint: {required}"));
            return Ok(BucketSelectionTrace { task_id: task_id.to_string(), selected_bucket: required.clone(), reasoning, timestamp });
        }
    }

    let excluded: &[String] = request.constraints.as_ref().map_or(&[], |c| &c.excluded_buckets[..]);
    let mut remaining: Vec<&Bucket> = buckets.iter().filter(|b| !excluded.iter().any(|e| e == &b.name)).collect();
    remaining.sort_by_key(|b| b.max_duration_ms);
    if !excluded.is_empty() {
        reasoning.push(format!("Excluded buckets: {}", excluded.join(", ")));
    }
    if remaining.is_empty() {
        return Err(SchedulerError::NoBucketsAvailable);
    }

    let mut index = remaining.iter().position(|b| b.max_duration_ms >= request.estimated_duration_ms).map_or_else(
        || {
            let fallback = remaining.len() - 1;
            reasoning.push(format!("Using fallback bucket: {}", remaining[fallback].name));
            fallback
        },
        |index| {
            reasoning.push(format!("Selected shortest-fit bucket: {}", remaining[index].name));
            index
        },
    );

    let should_escalate = request.complexity >= COMPLEXITY_ESCALATION_THRESHOLD || request.dependencies.len() >= DEPENDENCY_ESCALATION_THRESHOLD;
    if should_escalate && index + 1 < remaining.len() {
        index += 1;
        reasoning.push(format!("Escalated to longer bucket due to complexity/dependencies: {}", remaining[index].name));
    }

    Ok(BucketSelectionTrace { task_id: task_id.to_string(), selected_bucket: remaining[index].name.clone(), reasoning, timestamp })
}
