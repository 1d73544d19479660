//! In-process cache backend built on `moka`.

use crate::cache::ports::{CacheBackend, CacheResult};
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

/// Bounded in-process cache backend with optional entry expiry.
#[derive(Clone)]
pub struct MokaCacheBackend {
    entries: Cache<String, String>,
}

impl MokaCacheBackend {
    /// Creates a backend holding at most `max_capacity` entries, each
    /// expiring `time_to_live` after insertion when set.
    #[must_use]
    pub fn new(max_capacity: u64, time_to_live: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_capacity);
        if let Some(ttl) = time_to_live {
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
        }
    }
}

impl std::fmt::Debug for MokaCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheBackend")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheBackend for MokaCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> CacheResult<()> {
        self.entries.insert(key.to_owned(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}
