//! Background removal of a snapshot's insights artifacts.

use super::sync::{SnapshotSync, TaskSync};
use crate::snapshot::domain::{Snapshot, SnapshotStatus};
use crate::storage::{domain::MediaIdentifier, ports::ObjectStorage};
use crate::task::domain::Task;
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// Failure recorded on the deletion task when its job ends early.
pub(crate) const CLEANUP_INTERRUPTED: &str = "insights cleanup interrupted";

/// Removes the derived objects of a snapshot and settles its deletion task.
pub(crate) struct CleanupJob<C> {
    pub(crate) snapshots: SnapshotSync,
    pub(crate) tasks: TaskSync,
    pub(crate) storage: Arc<dyn ObjectStorage>,
    pub(crate) media: MediaIdentifier,
    pub(crate) clock: Arc<C>,
}

impl<C: Clock + Send + Sync + 'static> CleanupJob<C> {
    /// Returns the job removing the extracted text (image originals only)
    /// and the entities object, then returning the snapshot to `ready`.
    ///
    /// The task is deleted when every removal succeeded and marked `error`
    /// with the newline-joined failure messages otherwise.
    ///
    /// The task and snapshot are settled even when the returned future is
    /// dropped before completion, whether still queued or mid-removal. The
    /// task then fails with [`CLEANUP_INTERRUPTED`] and artifacts not yet
    /// removed stay recorded on the snapshot.
    pub(crate) fn run(
        self,
        task: Task,
        snapshot: Snapshot,
    ) -> impl Future<Output = ()> + Send + 'static {
        let guard = SettleOnDrop {
            pending: Some(Settlement {
                snapshots: self.snapshots.clone(),
                tasks: self.tasks.clone(),
                clock: Arc::clone(&self.clock),
                task,
                snapshot,
                failures: Vec::new(),
            }),
        };
        self.remove_artifacts(guard)
    }

    async fn remove_artifacts(self, mut guard: SettleOnDrop<C>) {
        let Some(state) = guard.pending.as_mut() else {
            return;
        };
        let clock = &*self.clock;

        let original_is_image = state
            .snapshot
            .original()
            .is_some_and(|original| self.media.is_image(original.key()));
        if let Some(text) = state.snapshot.text().filter(|_| original_is_image).cloned() {
            match self.storage.remove_object(&text).await {
                Ok(()) => state.snapshot.clear_text(clock),
                Err(err) => state.failures.push(err.to_string()),
            }
        }
        if let Some(entities) = state.snapshot.entities().cloned() {
            let removed = self.storage.remove_object(&entities).await;
            state.failures.extend(removed.err().map(|err| err.to_string()));
        }
        state.snapshot.clear_entities(clock);

        guard.settle().await;
    }
}

/// Records of a cleanup waiting to be written back.
struct Settlement<C> {
    snapshots: SnapshotSync,
    tasks: TaskSync,
    clock: Arc<C>,
    task: Task,
    snapshot: Snapshot,
    failures: Vec<String>,
}

impl<C: Clock + Send + Sync + 'static> Settlement<C> {
    async fn apply(mut self) {
        let clock = &*self.clock;
        if self.failures.is_empty() {
            if let Err(err) = self.tasks.delete_and_sync(self.task.id()).await {
                error!(task_id = %self.task.id(), error = %err, "failed to delete cleanup task");
            }
        } else {
            let message = self.failures.join("\n");
            warn!(task_id = %self.task.id(), %message, "insights cleanup incomplete");
            match self.task.fail(message, clock) {
                Ok(()) => {
                    if let Err(err) = self.tasks.save_and_sync(&self.task).await {
                        error!(task_id = %self.task.id(), error = %err, "failed to save cleanup task");
                    }
                }
                Err(err) => {
                    error!(task_id = %self.task.id(), error = %err, "cannot fail cleanup task");
                }
            }
        }

        self.snapshot.detach_task(clock);
        let settled = if self.snapshot.status() == SnapshotStatus::Ready {
            Ok(())
        } else {
            self.snapshot.transition_to(SnapshotStatus::Ready, clock)
        };
        if let Err(err) = settled {
            error!(snapshot_id = %self.snapshot.id(), error = %err, "cannot settle snapshot");
            return;
        }
        match self.snapshots.save_and_sync(&self.snapshot).await {
            Ok(()) => info!(snapshot_id = %self.snapshot.id(), "insights deleted"),
            Err(err) => {
                error!(snapshot_id = %self.snapshot.id(), error = %err, "failed to save snapshot");
            }
        }
    }
}

/// Owns a pending [`Settlement`] and writes it back exactly once.
///
/// Settlement runs on its own runtime task so aborting the cleanup job
/// cannot cut it short.
struct SettleOnDrop<C: Clock + Send + Sync + 'static> {
    pending: Option<Settlement<C>>,
}

impl<C: Clock + Send + Sync + 'static> SettleOnDrop<C> {
    async fn settle(mut self) {
        let Some(settlement) = self.pending.take() else {
            return;
        };
        if let Err(err) = tokio::spawn(settlement.apply()).await {
            error!(error = %err, "insights cleanup settlement failed");
        }
    }
}

impl<C: Clock + Send + Sync + 'static> Drop for SettleOnDrop<C> {
    fn drop(&mut self) {
        let Some(mut settlement) = self.pending.take() else {
            return;
        };
        warn!(task_id = %settlement.task.id(), "insights cleanup interrupted before settling");
        settlement.failures.push(CLEANUP_INTERRUPTED.to_owned());
        match Handle::try_current() {
            Ok(runtime) => drop(runtime.spawn(settlement.apply())),
            Err(err) => {
                error!(task_id = %settlement.task.id(), error = %err, "cannot settle interrupted cleanup");
            }
        }
    }
}
