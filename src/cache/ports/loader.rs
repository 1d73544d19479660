//! Store-backed loading of cache entries.

use super::{CacheError, CacheResult};
use crate::cache::domain::Cacheable;
use crate::file::{
    domain::{File, FileId},
    ports::FileRepository,
};
use crate::snapshot::{
    domain::{Snapshot, SnapshotId},
    ports::SnapshotRepository,
};
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskRepository,
};
use async_trait::async_trait;

/// Loads the authoritative value of a cached aggregate from its store.
#[async_trait]
pub trait CacheLoader<E: Cacheable>: Send + Sync {
    /// Loads the record for `id`, returning `None` when the store has none.
    async fn load(&self, id: E::Id) -> CacheResult<Option<E>>;
}

#[async_trait]
impl<R> CacheLoader<File> for R
where
    R: FileRepository + ?Sized,
{
    async fn load(&self, id: FileId) -> CacheResult<Option<File>> {
        self.find_by_id(id).await.map_err(CacheError::store)
    }
}

#[async_trait]
impl<R> CacheLoader<Snapshot> for R
where
    R: SnapshotRepository + ?Sized,
{
    async fn load(&self, id: SnapshotId) -> CacheResult<Option<Snapshot>> {
        self.find_by_id(id).await.map_err(CacheError::store)
    }
}

#[async_trait]
impl<R> CacheLoader<Task> for R
where
    R: TaskRepository + ?Sized,
{
    async fn load(&self, id: TaskId) -> CacheResult<Option<Task>> {
        self.find_by_id(id).await.map_err(CacheError::store)
    }
}
