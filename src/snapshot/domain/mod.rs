//! Domain model for snapshots.
//!
//! A snapshot is never deleted individually; it is superseded by newer
//! versions of the same file or removed together with the file.

mod error;
mod ids;
mod snapshot;

pub use error::{ParseSnapshotStatusError, SnapshotDomainError};
pub use ids::SnapshotId;
pub use snapshot::{
    InsightsArtifacts, PersistedSnapshotData, Snapshot, SnapshotStatus, SnapshotVersion,
};
