//! Keeps the store, cache and search index of tasks and snapshots in step.
//!
//! The store is authoritative. The cache is refreshed from it immediately
//! after every write, so reads through the cache never observe an older
//! record than the last successful save. The search index is best-effort:
//! failures are logged and never fail the write.

use super::error::{InsightsError, InsightsResult};
use crate::cache::{
    ports::CacheBackend,
    services::{ReadThroughCache, SnapshotCache, TaskCache},
};
use crate::file::domain::{FileId, UserId};
use crate::search::{
    domain::QueryOptions,
    ports::{SearchIndex, SearchResult},
    services::SearchMirror,
};
use crate::snapshot::{
    domain::{Snapshot, SnapshotId, SnapshotVersion},
    ports::SnapshotRepository,
};
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskRepository,
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

fn log_index_failure(result: SearchResult<()>, index: &str, id: &str) {
    if let Err(err) = result {
        warn!(index, id, error = %err, "search index update failed");
    }
}

/// Synchronised access to task records.
#[derive(Clone)]
pub struct TaskSync {
    repository: Arc<dyn TaskRepository>,
    cache: TaskCache,
    search: SearchMirror<Task>,
}

impl TaskSync {
    /// Creates the helper over a task store, cache backend and search index.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        cache: Arc<dyn CacheBackend>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            cache: ReadThroughCache::new(cache, Arc::clone(&repository)),
            repository,
            search: SearchMirror::new(index),
        }
    }

    /// Reads a task through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::TaskNotFound`] when no record exists.
    pub async fn find(&self, id: TaskId) -> InsightsResult<Task> {
        self.cache
            .get(id)
            .await
            .map_err(|err| InsightsError::from_cache(err, InsightsError::TaskNotFound(id)))
    }

    /// Reads a task through the cache, mapping absence to `None`.
    ///
    /// # Errors
    ///
    /// Returns cache and store failures.
    pub async fn find_optional(&self, id: TaskId) -> InsightsResult<Option<Task>> {
        match self.find(id).await {
            Ok(task) => Ok(Some(task)),
            Err(InsightsError::TaskNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Stores a new task, caches it and adds it to the index.
    ///
    /// # Errors
    ///
    /// Returns store and cache failures.
    pub async fn insert_and_sync(&self, task: &Task) -> InsightsResult<()> {
        self.repository.store(task).await?;
        self.cache.refresh(task.id()).await?;
        let id = task.id().to_string();
        log_index_failure(
            self.search.index(std::slice::from_ref(task)).await,
            "task",
            &id,
        );
        Ok(())
    }

    /// Updates a task, refreshes the cache and updates the index.
    ///
    /// # Errors
    ///
    /// Returns store and cache failures.
    pub async fn save_and_sync(&self, task: &Task) -> InsightsResult<()> {
        self.repository.update(task).await?;
        self.cache.refresh(task.id()).await?;
        let id = task.id().to_string();
        log_index_failure(
            self.search.update(std::slice::from_ref(task)).await,
            "task",
            &id,
        );
        Ok(())
    }

    /// Deletes a task from the store, the cache and the index.
    ///
    /// # Errors
    ///
    /// Returns store and cache failures.
    pub async fn delete_and_sync(&self, id: TaskId) -> InsightsResult<()> {
        self.repository.delete(id).await?;
        self.cache.delete(id).await?;
        let raw_id = id.to_string();
        log_index_failure(self.search.delete(vec![raw_id.clone()]).await, "task", &raw_id);
        Ok(())
    }

    /// Returns `user_id`'s tasks whose indexed fields match `query`.
    ///
    /// Hits are re-read through the cache so callers see the authoritative
    /// record; hits whose record is already gone are skipped.
    ///
    /// # Errors
    ///
    /// Returns search, cache and store failures.
    pub async fn search(
        &self,
        query: &str,
        user_id: UserId,
        options: QueryOptions,
    ) -> InsightsResult<Vec<Task>> {
        let owner = user_id.to_string();
        let documents = self.search.query(query, options).await?;
        let mut tasks = Vec::new();
        for document in documents.into_iter().filter(|doc| doc.user_id == owner) {
            let Ok(uuid) = Uuid::parse_str(&document.id) else {
                debug!(id = %document.id, "skipping hit with malformed id");
                continue;
            };
            if let Some(task) = self.find_optional(TaskId::from_uuid(uuid)).await? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}

/// Synchronised access to snapshot records.
#[derive(Clone)]
pub struct SnapshotSync {
    repository: Arc<dyn SnapshotRepository>,
    cache: SnapshotCache,
    search: SearchMirror<Snapshot>,
}

impl SnapshotSync {
    /// Creates the helper over a snapshot store, cache backend and search
    /// index.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        cache: Arc<dyn CacheBackend>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            cache: ReadThroughCache::new(cache, Arc::clone(&repository)),
            repository,
            search: SearchMirror::new(index),
        }
    }

    /// Reads a snapshot through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::SnapshotNotFound`] when no record exists.
    pub async fn find(&self, id: SnapshotId) -> InsightsResult<Snapshot> {
        self.cache
            .get(id)
            .await
            .map_err(|err| InsightsError::from_cache(err, InsightsError::SnapshotNotFound(id)))
    }

    /// Returns the snapshots of `file_id` older than `before`, newest first.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub async fn find_all_previous(
        &self,
        file_id: FileId,
        before: SnapshotVersion,
    ) -> InsightsResult<Vec<Snapshot>> {
        Ok(self.repository.find_all_previous(file_id, before).await?)
    }

    /// Stores a new snapshot, caches it and adds it to the index.
    ///
    /// # Errors
    ///
    /// Returns store and cache failures.
    pub async fn insert_and_sync(&self, snapshot: &Snapshot) -> InsightsResult<()> {
        self.repository.store(snapshot).await?;
        self.cache.refresh(snapshot.id()).await?;
        let id = snapshot.id().to_string();
        log_index_failure(
            self.search.index(std::slice::from_ref(snapshot)).await,
            "snapshot",
            &id,
        );
        Ok(())
    }

    /// Updates a snapshot, refreshes the cache and updates the index.
    ///
    /// # Errors
    ///
    /// Returns store and cache failures.
    pub async fn save_and_sync(&self, snapshot: &Snapshot) -> InsightsResult<()> {
        self.repository.update(snapshot).await?;
        self.cache.refresh(snapshot.id()).await?;
        let id = snapshot.id().to_string();
        log_index_failure(
            self.search.update(std::slice::from_ref(snapshot)).await,
            "snapshot",
            &id,
        );
        Ok(())
    }
}
