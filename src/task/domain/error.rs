//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while mutating task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The status transition is not allowed by the task state machine.
    #[error("invalid task status transition for {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Progress percentages are bounded to 0..=100.
    #[error("invalid task percentage {0}, expected 0..=100")]
    InvalidPercentage(u8),

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
