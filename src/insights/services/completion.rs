//! Application of pipeline worker reports to tasks and snapshots.

use super::{
    error::{InsightsError, InsightsResult},
    locks::SnapshotLocks,
    sync::{SnapshotSync, TaskSync},
};
use crate::pipeline::domain::{PipelineOutcome, PipelineReport};
use crate::snapshot::domain::SnapshotStatus;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Applies progress and completion reported by the pipeline worker.
pub struct PipelineCompletionService<C> {
    snapshots: SnapshotSync,
    tasks: TaskSync,
    locks: SnapshotLocks,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync> PipelineCompletionService<C> {
    /// Creates the service over shared stores and snapshot locks.
    #[must_use]
    pub const fn new(
        snapshots: SnapshotSync,
        tasks: TaskSync,
        locks: SnapshotLocks,
        clock: Arc<C>,
    ) -> Self {
        Self {
            snapshots,
            tasks,
            locks,
            clock,
        }
    }

    /// Applies `report`.
    ///
    /// Progress moves a waiting task to running and the snapshot to
    /// `processing`. Success stores the produced artifacts, settles the
    /// snapshot as `ready` and deletes the task. Failure marks the task
    /// `error`, moves the snapshot to `error` and detaches the task.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::TaskNotFound`] or
    /// [`InsightsError::SnapshotNotFound`] for unknown records,
    /// [`InsightsError::StaleReport`] when the snapshot no longer references
    /// the task, state machine violations and store failures.
    #[instrument(skip_all, fields(task_id = %report.task_id, snapshot_id = %report.snapshot_id))]
    pub async fn apply(&self, report: PipelineReport) -> InsightsResult<()> {
        let PipelineReport {
            task_id,
            snapshot_id,
            outcome,
        } = report;
        let _guard = self.locks.acquire(snapshot_id).await?;
        let mut task = self.tasks.find(task_id).await?;
        let mut snapshot = self.snapshots.find(snapshot_id).await?;
        if snapshot.task_id() != Some(task_id) {
            warn!("discarding report of a task the snapshot no longer references");
            return Err(InsightsError::StaleReport {
                task_id,
                snapshot_id,
            });
        }
        let clock = &*self.clock;

        match outcome {
            PipelineOutcome::Progress { percentage } => {
                task.report_progress(percentage, clock)?;
                self.tasks.save_and_sync(&task).await?;
                if snapshot.status() == SnapshotStatus::Waiting {
                    snapshot.transition_to(SnapshotStatus::Processing, clock)?;
                    self.snapshots.save_and_sync(&snapshot).await?;
                }
            }
            PipelineOutcome::Succeeded(artifacts) => {
                snapshot.record_insights(artifacts, clock);
                snapshot.transition_to(SnapshotStatus::Ready, clock)?;
                snapshot.detach_task(clock);
                self.snapshots.save_and_sync(&snapshot).await?;
                self.tasks.delete_and_sync(task_id).await?;
                info!("insights ready");
            }
            PipelineOutcome::Failed { message } => {
                warn!(%message, "insights pipeline failed");
                task.fail(message, clock)?;
                snapshot.transition_to(SnapshotStatus::Error, clock)?;
                snapshot.detach_task(clock);
                self.tasks.save_and_sync(&task).await?;
                self.snapshots.save_and_sync(&snapshot).await?;
            }
        }
        Ok(())
    }
}
