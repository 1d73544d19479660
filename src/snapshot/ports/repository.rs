//! Repository port for snapshot persistence and version lookup.

use crate::file::domain::FileId;
use crate::snapshot::domain::{Snapshot, SnapshotId, SnapshotVersion};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot repository operations.
pub type SnapshotRepositoryResult<T> = Result<T, SnapshotRepositoryError>;

/// Snapshot persistence contract.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Stores a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotRepositoryError::DuplicateSnapshot`] when the
    /// identifier exists or [`SnapshotRepositoryError::DuplicateVersion`]
    /// when the file already has a snapshot with the same version.
    async fn store(&self, snapshot: &Snapshot) -> SnapshotRepositoryResult<()>;

    /// Persists changes to an existing snapshot (status, language, task
    /// reference, artifact pointers, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotRepositoryError::NotFound`] when the snapshot does
    /// not exist.
    async fn update(&self, snapshot: &Snapshot) -> SnapshotRepositoryResult<()>;

    /// Finds a snapshot by identifier.
    ///
    /// Returns `None` when the snapshot does not exist.
    async fn find_by_id(&self, id: SnapshotId) -> SnapshotRepositoryResult<Option<Snapshot>>;

    /// Returns the file's snapshots older than `before`, newest first.
    async fn find_all_previous(
        &self,
        file_id: FileId,
        before: SnapshotVersion,
    ) -> SnapshotRepositoryResult<Vec<Snapshot>>;
}

/// Errors returned by snapshot repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SnapshotRepositoryError {
    /// A snapshot with the same identifier already exists.
    #[error("duplicate snapshot identifier: {0}")]
    DuplicateSnapshot(SnapshotId),

    /// The file already has a snapshot with this version.
    #[error("file {file_id} already has snapshot version {version}")]
    DuplicateVersion {
        /// Owning file.
        file_id: FileId,
        /// Conflicting version.
        version: SnapshotVersion,
    },

    /// The snapshot was not found.
    #[error("snapshot not found: {0}")]
    NotFound(SnapshotId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SnapshotRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
