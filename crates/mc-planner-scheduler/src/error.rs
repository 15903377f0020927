// crates/mc-planner-scheduler/src/error.rs
// ============================================================================
// Module: Task-Timeframe Manager Errors
// Description: Unrecoverable failures raised by bucket selection and task
//              lifecycle management.
// Dependencies: none
// ============================================================================

use thiserror::Error;

/// Errors raised while selecting a bucket or managing task lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// A bucket name was not found among the configured buckets.
    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),
    /// No task with the given id is active.
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    /// A task already exists under this id.
    #[error("Task already active: {0}")]
    TaskAlreadyActive(String),
    /// A lifecycle method was called on a task in the wrong state.
    #[error("task {task_id} is {actual}, expected {expected}")]
    InvalidState {
        /// The offending task's id.
        task_id: String,
        /// The state the caller needed.
        expected: &'static str,
        /// The state the task was actually in.
        actual: &'static str,
    },
    /// No resume ticket with the given id is outstanding.
    #[error("Resume ticket not found")]
    TicketNotFound,
    /// A resume ticket exists but has passed its expiry.
    #[error("Resume ticket expired")]
    TicketExpired,
    /// Every configured bucket was excluded, leaving none to select from.
    #[error("no buckets remain after applying exclusions")]
    NoBucketsAvailable,
}
