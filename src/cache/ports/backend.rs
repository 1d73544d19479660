//! Key/value backend port for cached JSON documents.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// String key/value storage used by the read-through cache.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}

/// Errors returned by cache operations.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Neither the cache nor the owning store holds the record.
    #[error("no record found for cache key {0}")]
    NotFound(String),

    /// The cache backend failed.
    #[error("cache backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),

    /// A cached document could not be encoded or decoded.
    #[error("cache codec error: {0}")]
    Codec(Arc<dyn std::error::Error + Send + Sync>),

    /// The owning store failed while refreshing an entry.
    #[error("cache store error: {0}")]
    Store(Arc<dyn std::error::Error + Send + Sync>),
}

impl CacheError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Wraps a serialisation error.
    pub fn codec(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Codec(Arc::new(err))
    }

    /// Wraps an error from the owning store.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Arc::new(err))
    }
}
