//! Task aggregate root and its status state machine.

use super::{ParseTaskStatusError, TaskDomainError, TaskId};
use crate::file::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Payload key carrying the display name of the object a task works on.
pub const TASK_PAYLOAD_OBJECT_KEY: &str = "object";

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is queued and work has not started.
    Waiting,
    /// Task is being worked on.
    Running,
    /// Task finished successfully.
    Success,
    /// Task failed.
    Error,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Returns whether the status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Running | Self::Success | Self::Error)
                | (Self::Running, Self::Success | Self::Error)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, ParseTaskStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "waiting" => Ok(Self::Waiting),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Parameters for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Human-readable task name.
    pub name: String,
    /// Owner of the task.
    pub user_id: UserId,
    /// Initial status.
    pub status: TaskStatus,
    /// Whether progress cannot be expressed as a percentage.
    pub is_indeterminate: bool,
    /// Free-form string payload.
    pub payload: BTreeMap<String, String>,
}

impl NewTask {
    /// Creates parameters for an indeterminate task in `status`.
    #[must_use]
    pub fn indeterminate(name: impl Into<String>, user_id: UserId, status: TaskStatus) -> Self {
        Self {
            name: name.into(),
            user_id,
            status,
            is_indeterminate: true,
            payload: BTreeMap::new(),
        }
    }

    /// Adds a payload entry.
    #[must_use]
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    name: String,
    user_id: UserId,
    status: TaskStatus,
    is_indeterminate: bool,
    percentage: Option<u8>,
    error: Option<String>,
    payload: BTreeMap<String, String>,
    create_time: DateTime<Utc>,
    update_time: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: String,
    /// Persisted owner.
    pub user_id: UserId,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted indeterminate flag.
    pub is_indeterminate: bool,
    /// Persisted progress.
    pub percentage: Option<u8>,
    /// Persisted error message.
    pub error: Option<String>,
    /// Persisted payload.
    pub payload: BTreeMap<String, String>,
    /// Persisted creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Persisted update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyName`] when the name is blank.
    pub fn new(params: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let NewTask {
            name,
            user_id,
            status,
            is_indeterminate,
            payload,
        } = params;
        if name.trim().is_empty() {
            return Err(TaskDomainError::EmptyName);
        }

        Ok(Self {
            id: TaskId::new(),
            name,
            user_id,
            status,
            is_indeterminate,
            percentage: None,
            error: None,
            payload,
            create_time: clock.utc(),
            update_time: None,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            user_id: data.user_id,
            status: data.status,
            is_indeterminate: data.is_indeterminate,
            percentage: data.percentage,
            error: data.error,
            payload: data.payload,
            create_time: data.create_time,
            update_time: data.update_time,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns whether progress is indeterminate.
    #[must_use]
    pub const fn is_indeterminate(&self) -> bool {
        self.is_indeterminate
    }

    /// Returns the last reported progress.
    #[must_use]
    pub const fn percentage(&self) -> Option<u8> {
        self.percentage
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the task payload.
    #[must_use]
    pub const fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    /// Returns a payload value by key.
    #[must_use]
    pub fn payload_value(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn update_time(&self) -> Option<DateTime<Utc>> {
        self.update_time
    }

    /// Returns whether the task still blocks new work on its subject.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Moves the task to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the state
    /// machine does not allow the move.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Marks the task as failed with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the task is
    /// already finished.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.transition_to(TaskStatus::Error, clock)?;
        self.error = Some(message.into());
        Ok(())
    }

    /// Records determinate progress, starting a waiting task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPercentage`] above 100 and
    /// [`TaskDomainError::InvalidStatusTransition`] for finished tasks.
    pub fn report_progress(
        &mut self,
        percentage: u8,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if percentage > 100 {
            return Err(TaskDomainError::InvalidPercentage(percentage));
        }
        match self.status {
            TaskStatus::Waiting => self.transition_to(TaskStatus::Running, clock)?,
            TaskStatus::Running => {}
            TaskStatus::Success | TaskStatus::Error => {
                return Err(TaskDomainError::InvalidStatusTransition {
                    task_id: self.id,
                    from: self.status,
                    to: TaskStatus::Running,
                });
            }
        }
        self.is_indeterminate = false;
        self.percentage = Some(percentage);
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.update_time = Some(clock.utc());
    }
}
