//! Insights application services.

mod background;
mod cleanup;
mod completion;
mod error;
mod locks;
mod orchestrator;
mod sync;

pub use background::{BackgroundHandle, BackgroundOutcome, BackgroundRunner};
pub use completion::PipelineCompletionService;
pub use error::{ErrorKind, ErrorResponse, InsightsError, InsightsResult};
pub use locks::SnapshotLocks;
pub use orchestrator::{
    DELETING_TASK_NAME, InsightsDeletion, InsightsDependencies, InsightsDownload,
    InsightsService, WAITING_TASK_NAME,
};
pub use sync::{SnapshotSync, TaskSync};
