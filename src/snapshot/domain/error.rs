//! Error types for snapshot domain validation and parsing.

use super::{SnapshotId, SnapshotStatus};
use thiserror::Error;

/// Errors returned while mutating snapshot values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotDomainError {
    /// The status transition is not allowed by the snapshot state machine.
    #[error("invalid snapshot status transition for {snapshot_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Snapshot being transitioned.
        snapshot_id: SnapshotId,
        /// Current status.
        from: SnapshotStatus,
        /// Requested status.
        to: SnapshotStatus,
    },

    /// Snapshot versions start at one.
    #[error("snapshot version must be positive")]
    InvalidVersion,
}

/// Error returned while parsing snapshot statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown snapshot status: {0}")]
pub struct ParseSnapshotStatusError(pub String);
