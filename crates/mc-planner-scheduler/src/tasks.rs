// crates/mc-planner-scheduler/src/tasks.rs
// ============================================================================
// Module: Task-Timeframe Manager
// Description: Task lifecycle tracking, pause/resume tickets, and bucket
//              statistics, all driven by caller-supplied time.
// Dependencies: mc-planner-core::time, crate::buckets, crate::error
// ============================================================================

//! ## Overview
//! The manager owns two maps — active/retained task state and outstanding
//! resume tickets — behind its public surface; every mutation happens
//! through its methods. Nothing here reads wall-clock time: every call
//! takes an explicit `now`, matching the rest of this workspace's
//! caller-supplied-time discipline. Timeouts are edge-triggered: a task
//! past its bucket's duration is only marked `timeout` the next time a
//! state-touching call observes it, never by a background reaper.

use std::collections::BTreeMap;

use mc_planner_core::time::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::buckets::Bucket;
use crate::error::SchedulerError;

/// A task's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Actively running within its bucket's window.
    Running,
    /// Paused with an outstanding resume ticket.
    Paused,
    /// Finished successfully; removed from tracking once reached.
    Completed,
    /// Finished unsuccessfully; retained for statistics.
    Failed,
    /// Exceeded its bucket's `max_duration_ms`; retained for statistics.
    Timeout,
}

/// Tracked state for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    /// Task identifier.
    pub task_id: String,
    /// Bucket this task was started in.
    pub bucket_name: String,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// When this run (or the current resumed run) started.
    pub start_time: Timestamp,
    /// Caller-recorded checkpoint labels.
    pub checkpoints: Vec<String>,
    /// Caller-supplied metadata, opaque to this module.
    pub metadata: BTreeMap<String, String>,
}

/// A ticket allowing a paused task to be resumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeTicket {
    /// Ticket identifier: `"{taskId}-{monotonic}-{random}"`.
    pub id: String,
    /// The task this ticket resumes.
    pub task_id: String,
    /// The bucket the task was paused from.
    pub bucket_name: String,
    /// Optional bucket-trailer option this pause was recorded against.
    pub trailer_option_id: Option<String>,
    /// When this ticket was issued.
    pub created_at: Timestamp,
    /// When this ticket stops being valid.
    pub expires_at: Timestamp,
}

/// Per-bucket task-outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStatistics {
    /// Tasks currently running or paused in this bucket.
    pub active: u64,
    /// Tasks that reached [`TaskStatus::Completed`] in this bucket.
    pub completed: u64,
    /// Tasks that reached [`TaskStatus::Failed`] in this bucket.
    pub failed: u64,
    /// Tasks that reached [`TaskStatus::Timeout`] in this bucket.
    pub timeout: u64,
}

/// Tracks task lifecycle state, pause/resume tickets, and per-bucket
/// statistics for one planning session.
#[derive(Debug, Clone)]
pub struct TaskTimeframeManager {
    /// Configured buckets, in whatever order the caller supplied.
    buckets: Vec<Bucket>,
    /// Every tracked task not yet completed, keyed by task id.
    tasks: BTreeMap<String, TaskState>,
    /// Outstanding, unconsumed resume tickets, keyed by ticket id.
    tickets: BTreeMap<String, ResumeTicket>,
    /// Completed-task counts per bucket, since completed task state is
    /// discarded on completion.
    completed_counts: BTreeMap<String, u64>,
    /// Monotonic counter feeding the next resume ticket's id.
    next_ticket_seq: u64,
}

impl TaskTimeframeManager {
    /// Builds a manager over `buckets`.
    #[must_use]
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self { buckets, tasks: BTreeMap::new(), tickets: BTreeMap::new(), completed_counts: BTreeMap::new(), next_ticket_seq: 0 }
    }

    /// Looks up a configured bucket by name.
    fn bucket(&self, name: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// Edge-triggers a timeout on `task_id` if its bucket window has
    /// elapsed. No-op for tasks that are absent, already terminal, or
    /// whose bucket no longer exists.
    fn apply_timeout_if_due(&mut self, task_id: &str, now: Timestamp) {
        let Some(task) = self.tasks.get(task_id) else { return };
        if task.status != TaskStatus::Running && task.status != TaskStatus::Paused {
            return;
        }
        let Some(bucket) = self.bucket(&task.bucket_name) else { return };
        let elapsed = now.as_unix_millis().saturating_sub(task.start_time.as_unix_millis());
        #[allow(clippy::cast_possible_wrap, reason = "bucket durations fit well within i64 range for any realistic configuration")]
        if elapsed > bucket.max_duration_ms as i64 {
            if let Some(task) = self.tasks.get_mut(task_id) {
                task.status = TaskStatus::Timeout;
            }
        }
    }

    /// Starts a new task in `bucket_name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownBucket`] when `bucket_name` is not
    /// configured, and [`SchedulerError::TaskAlreadyActive`] when
    /// `task_id` is already tracked.
    pub fn start_task(&mut self, task_id: &str, bucket_name: &str, now: Timestamp, metadata: BTreeMap<String, String>) -> Result<(), SchedulerError> {
        if self.bucket(bucket_name).is_none() {
            return Err(SchedulerError::UnknownBucket(bucket_name.to_string()));
        }
        if self.tasks.contains_key(task_id) {
            return Err(SchedulerError::TaskAlreadyActive(task_id.to_string()));
        }
        self.tasks.insert(
            task_id.to_string(),
            TaskState { task_id: task_id.to_string(), bucket_name: bucket_name.to_string(), status: TaskStatus::Running, start_time: now, checkpoints: Vec::new(), metadata },
        );
        Ok(())
    }

    /// Pauses a running task, issuing a resume ticket.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskNotFound`] when `task_id` is not
    /// tracked, and [`SchedulerError::InvalidState`] when it is not
    /// [`TaskStatus::Running`].
    pub fn pause_task(&mut self, task_id: &str, trailer_option_id: Option<String>, random_suffix: &str, now: Timestamp) -> Result<ResumeTicket, SchedulerError> {
        self.apply_timeout_if_due(task_id, now);
        let task = self.tasks.get_mut(task_id).ok_or_else(|| SchedulerError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Running {
            return Err(SchedulerError::InvalidState { task_id: task_id.to_string(), expected: "running", actual: status_label(task.status) });
        }
        let Some(bucket) = self.bucket(&task.bucket_name) else { return Err(SchedulerError::UnknownBucket(task.bucket_name.clone())) };

        let seq = self.next_ticket_seq;
        self.next_ticket_seq += 1;
        let ticket_id = format!("{task_id}-{seq}-{random_suffix}");
        #[allow(clippy::cast_possible_wrap, reason = "bucket durations fit well within i64 range for any realistic configuration")]
        let expires_at = Timestamp::from_unix_millis(now.as_unix_millis() + bucket.max_duration_ms as i64);
        let ticket = ResumeTicket { id: ticket_id.clone(), task_id: task_id.to_string(), bucket_name: task.bucket_name.clone(), trailer_option_id, created_at: now, expires_at };

        task.status = TaskStatus::Paused;
        self.tickets.insert(ticket_id, ticket.clone());
        Ok(ticket)
    }

    /// Resumes a task from an outstanding, unexpired ticket. The ticket is
    /// consumed regardless of outcome past expiry.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TicketNotFound`] when `ticket_id` is
    /// unknown, [`SchedulerError::TicketExpired`] when it has expired, and
    /// [`SchedulerError::TaskNotFound`] when the underlying task is gone.
    pub fn resume_task(&mut self, ticket_id: &str, now: Timestamp) -> Result<(), SchedulerError> {
        let ticket = self.tickets.get(ticket_id).cloned().ok_or(SchedulerError::TicketNotFound)?;
        if now.as_unix_millis() > ticket.expires_at.as_unix_millis() {
            self.tickets.remove(ticket_id);
            return Err(SchedulerError::TicketExpired);
        }
        self.tickets.remove(ticket_id);

        let task = self.tasks.get_mut(&ticket.task_id).ok_or_else(|| SchedulerError::TaskNotFound(ticket.task_id.clone()))?;
        task.status = TaskStatus::Running;
        task.start_time = now;
        Ok(())
    }

    /// Marks a running task completed, removing its tracked state.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskNotFound`] when `task_id` is not
    /// tracked, and [`SchedulerError::InvalidState`] when it is not
    /// [`TaskStatus::Running`].
    pub fn complete_task(&mut self, task_id: &str, now: Timestamp) -> Result<(), SchedulerError> {
        self.apply_timeout_if_due(task_id, now);
        let task = self.tasks.get(task_id).ok_or_else(|| SchedulerError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Running {
            return Err(SchedulerError::InvalidState { task_id: task_id.to_string(), expected: "running", actual: status_label(task.status) });
        }
        let bucket_name = task.bucket_name.clone();
        self.tasks.remove(task_id);
        *self.completed_counts.entry(bucket_name).or_insert(0) += 1;
        Ok(())
    }

    /// Marks a running task failed, retaining its state for statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskNotFound`] when `task_id` is not
    /// tracked, and [`SchedulerError::InvalidState`] when it is not
    /// [`TaskStatus::Running`].
    pub fn fail_task(&mut self, task_id: &str, now: Timestamp) -> Result<(), SchedulerError> {
        self.apply_timeout_if_due(task_id, now);
        let task = self.tasks.get_mut(task_id).ok_or_else(|| SchedulerError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Running {
            return Err(SchedulerError::InvalidState { task_id: task_id.to_string(), expected: "running", actual: status_label(task.status) });
        }
        task.status = TaskStatus::Failed;
        Ok(())
    }

    /// Records a checkpoint label against a tracked task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskNotFound`] when `task_id` is not
    /// tracked.
    pub fn record_checkpoint(&mut self, task_id: &str, label: &str, now: Timestamp) -> Result<(), SchedulerError> {
        self.apply_timeout_if_due(task_id, now);
        let task = self.tasks.get_mut(task_id).ok_or_else(|| SchedulerError::TaskNotFound(task_id.to_string()))?;
        task.checkpoints.push(label.to_string());
        Ok(())
    }

    /// Returns every task currently running or paused.
    #[must_use]
    pub fn active_tasks(&self) -> Vec<&TaskState> {
        self.tasks.values().filter(|t| t.status == TaskStatus::Running || t.status == TaskStatus::Paused).collect()
    }

    /// Returns per-bucket task-outcome counts.
    #[must_use]
    pub fn bucket_statistics(&self) -> BTreeMap<String, BucketStatistics> {
        let mut stats: BTreeMap<String, BucketStatistics> = self.buckets.iter().map(|b| (b.name.clone(), BucketStatistics::default())).collect();
        for task in self.tasks.values() {
            let entry = stats.entry(task.bucket_name.clone()).or_default();
            match task.status {
                TaskStatus::Running | TaskStatus::Paused => entry.active += 1,
                TaskStatus::Failed => entry.failed += 1,
                TaskStatus::Timeout => entry.timeout += 1,
                TaskStatus::Completed => {}
            }
        }
        for (bucket_name, count) in &self.completed_counts {
            stats.entry(bucket_name.clone()).or_default().completed = *count;
        }
        stats
    }

    /// Returns every outstanding (unconsumed) resume ticket.
    #[must_use]
    pub fn valid_resume_tickets(&self) -> Vec<&ResumeTicket> {
        self.tickets.values().collect()
    }

    /// Removes every ticket that has passed its expiry as of `now`,
    /// returning the count removed.
    pub fn cleanup_expired_tickets(&mut self, now: Timestamp) -> usize {
        let expired: Vec<String> = self.tickets.values().filter(|t| now.as_unix_millis() > t.expires_at.as_unix_millis()).map(|t| t.id.clone()).collect();
        for id in &expired {
            self.tickets.remove(id);
        }
        expired.len()
    }
}

/// Lowercase label for a status, used in [`SchedulerError::InvalidState`].
const fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Running => "running",
        TaskStatus::Paused => "paused",
        TaskStatus::Completed => "completed",
        TaskStatus::Failed => "failed",
        TaskStatus::Timeout => "timeout",
    }
}
