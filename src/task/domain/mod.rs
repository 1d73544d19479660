//! Domain model for background task records.

mod error;
mod ids;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use task::{NewTask, PersistedTaskData, TASK_PAYLOAD_OBJECT_KEY, Task, TaskStatus};
