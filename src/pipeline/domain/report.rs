//! Out-of-band reports sent back by the conversion worker.

use crate::snapshot::domain::{InsightsArtifacts, SnapshotId};
use crate::task::domain::TaskId;

/// Progress or completion of a submitted pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Task tracking the run.
    pub task_id: TaskId,
    /// Snapshot the run works on.
    pub snapshot_id: SnapshotId,
    /// What happened.
    pub outcome: PipelineOutcome,
}

/// State reported by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The run is still going.
    Progress {
        /// Completion percentage, 0..=100.
        percentage: u8,
    },
    /// The run finished and produced artifacts.
    Succeeded(InsightsArtifacts),
    /// The run failed.
    Failed {
        /// Worker-provided failure message.
        message: String,
    },
}
