// crates/mc-planner-scheduler/src/lib.rs
// ============================================================================
// Crate: mc-planner-scheduler
// Description: Task-timeframe management (bucket selection, task
//              lifecycle, pause/resume tickets) — Component I.
// ============================================================================

//! Assigns tasks to named duration buckets and tracks their lifecycle
//! through pause/resume tickets, driven entirely by caller-supplied time.

pub mod buckets;
pub mod error;
pub mod tasks;

pub use buckets::Bucket;
pub use buckets::BucketConstraints;
pub use buckets::BucketSelectionRequest;
pub use buckets::BucketSelectionTrace;
pub use buckets::default_buckets;
pub use buckets::select_bucket;

pub use error::SchedulerError;

pub use tasks::BucketStatistics;
pub use tasks::ResumeTicket;
pub use tasks::TaskState;
pub use tasks::TaskStatus;
pub use tasks::TaskTimeframeManager;
