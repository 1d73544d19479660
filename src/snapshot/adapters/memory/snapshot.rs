//! In-memory repository for snapshot lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::file::domain::FileId;
use crate::snapshot::{
    domain::{Snapshot, SnapshotId, SnapshotVersion},
    ports::{SnapshotRepository, SnapshotRepositoryError, SnapshotRepositoryResult},
};

/// Thread-safe in-memory snapshot repository.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotRepository {
    state: Arc<RwLock<InMemorySnapshotState>>,
}

#[derive(Debug, Default)]
struct InMemorySnapshotState {
    snapshots: HashMap<SnapshotId, Snapshot>,
    file_index: HashMap<FileId, Vec<SnapshotId>>,
}

impl InMemorySnapshotRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> SnapshotRepositoryError {
    SnapshotRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn store(&self, snapshot: &Snapshot) -> SnapshotRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.snapshots.contains_key(&snapshot.id()) {
            return Err(SnapshotRepositoryError::DuplicateSnapshot(snapshot.id()));
        }

        let file_id = snapshot.file_id();
        let version_taken = state
            .file_index
            .get(&file_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.snapshots.get(id))
            .any(|existing| existing.version() == snapshot.version());
        if version_taken {
            return Err(SnapshotRepositoryError::DuplicateVersion {
                file_id,
                version: snapshot.version(),
            });
        }

        state.file_index.entry(file_id).or_default().push(snapshot.id());
        state.snapshots.insert(snapshot.id(), snapshot.clone());
        Ok(())
    }

    async fn update(&self, snapshot: &Snapshot) -> SnapshotRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .snapshots
            .get_mut(&snapshot.id())
            .ok_or(SnapshotRepositoryError::NotFound(snapshot.id()))?;
        *stored = snapshot.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: SnapshotId) -> SnapshotRepositoryResult<Option<Snapshot>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.snapshots.get(&id).cloned())
    }

    async fn find_all_previous(
        &self,
        file_id: FileId,
        before: SnapshotVersion,
    ) -> SnapshotRepositoryResult<Vec<Snapshot>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut previous: Vec<Snapshot> = state
            .file_index
            .get(&file_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.snapshots.get(id))
            .filter(|snapshot| snapshot.version() < before)
            .cloned()
            .collect();
        previous.sort_by(|left, right| right.version().cmp(&left.version()));
        Ok(previous)
    }
}
