//! Per-snapshot serialisation of the pending-task check.
//!
//! The lock covers this process only. Separate processes sharing the same
//! stores are still only protected by the advisory pending-task check.

use super::error::{InsightsError, InsightsResult};
use crate::snapshot::domain::SnapshotId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of async locks keyed by snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotLocks {
    locks: Arc<Mutex<HashMap<SnapshotId, Arc<AsyncMutex<()>>>>>,
}

impl SnapshotLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `snapshot_id`.
    ///
    /// Entries nobody holds or waits on are pruned on every call.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Internal`] when the registry is poisoned.
    pub async fn acquire(&self, snapshot_id: SnapshotId) -> InsightsResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|err| InsightsError::Internal(format!("snapshot locks poisoned: {err}")))?;
            locks.retain(|id, entry| *id == snapshot_id || Arc::strong_count(entry) > 1);
            Arc::clone(locks.entry(snapshot_id).or_default())
        };
        Ok(lock.lock_owned().await)
    }

    /// Returns the number of tracked snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::Internal`] when the registry is poisoned.
    pub fn tracked(&self) -> InsightsResult<usize> {
        self.locks
            .lock()
            .map(|locks| locks.len())
            .map_err(|err| InsightsError::Internal(format!("snapshot locks poisoned: {err}")))
    }
}
