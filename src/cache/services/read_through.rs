//! Read-through cache over a key/value backend and an authoritative store.

use crate::cache::{
    domain::Cacheable,
    ports::{CacheBackend, CacheError, CacheLoader, CacheResult},
};
use crate::file::{domain::File, ports::FileRepository};
use crate::snapshot::{domain::Snapshot, ports::SnapshotRepository};
use crate::task::{domain::Task, ports::TaskRepository};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-through cache of files.
pub type FileCache = ReadThroughCache<File, dyn FileRepository>;

/// Read-through cache of snapshots.
pub type SnapshotCache = ReadThroughCache<Snapshot, dyn SnapshotRepository>;

/// Read-through cache of tasks.
pub type TaskCache = ReadThroughCache<Task, dyn TaskRepository>;

/// Cache whose reads fall back to the owning store on a miss.
pub struct ReadThroughCache<E, L: ?Sized> {
    backend: Arc<dyn CacheBackend>,
    loader: Arc<L>,
    entry: PhantomData<fn() -> E>,
}

impl<E, L: ?Sized> Clone for ReadThroughCache<E, L> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            loader: Arc::clone(&self.loader),
            entry: PhantomData,
        }
    }
}

impl<E, L> ReadThroughCache<E, L>
where
    E: Cacheable + Serialize + DeserializeOwned + Send + Sync,
    L: CacheLoader<E> + ?Sized,
{
    /// Creates a cache over `backend` that refreshes entries from `loader`.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, loader: Arc<L>) -> Self {
        Self {
            backend,
            loader,
            entry: PhantomData,
        }
    }

    /// Returns the cached value for `id`, refreshing it from the store when
    /// the entry is missing, unreadable or the backend fails.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] when the store has no record, or the
    /// store and backend errors raised while refreshing.
    pub async fn get(&self, id: E::Id) -> CacheResult<E> {
        let key = E::cache_key(id);
        match self.backend.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Err(err) => warn!(%key, error = %err, "discarding undecodable cache entry"),
            },
            Ok(None) => debug!(%key, "cache miss"),
            Err(err) => warn!(%key, error = %err, "cache read failed, loading from store"),
        }
        self.refresh(id).await
    }

    /// Reloads `id` from the store and replaces the cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] when the store has no record, or the
    /// store and backend errors raised while writing.
    pub async fn refresh(&self, id: E::Id) -> CacheResult<E> {
        let key = E::cache_key(id);
        let value = self
            .loader
            .load(id)
            .await?
            .ok_or_else(|| CacheError::NotFound(key.clone()))?;
        self.write(&key, &value).await?;
        Ok(value)
    }

    /// Stores `value` without consulting the store.
    ///
    /// # Errors
    ///
    /// Returns codec or backend errors.
    pub async fn set(&self, value: &E) -> CacheResult<()> {
        self.write(&E::cache_key(value.cache_id()), value).await
    }

    /// Removes the entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns backend errors.
    pub async fn delete(&self, id: E::Id) -> CacheResult<()> {
        self.backend.delete(&E::cache_key(id)).await
    }

    async fn write(&self, key: &str, value: &E) -> CacheResult<()> {
        let raw = serde_json::to_string(value).map_err(CacheError::codec)?;
        self.backend.set(key, raw).await
    }
}
