//! In-memory search index matching documents by substring.

use crate::search::{
    domain::{QueryOptions, SearchDocument},
    ports::{SearchError, SearchIndex, SearchResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory search index.
///
/// A document matches when any of its top-level string fields contains the
/// query, ignoring case. An empty query matches every document.
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchIndex {
    indexes: Arc<RwLock<HashMap<String, BTreeMap<String, Value>>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySearchIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the stored body of a document.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Backend`] when the index lock is poisoned.
    pub fn document(&self, index: &str, id: &str) -> SearchResult<Option<Value>> {
        let indexes = self.indexes.read().map_err(lock_error)?;
        Ok(indexes.get(index).and_then(|docs| docs.get(id)).cloned())
    }

    fn ensure_available(&self) -> SearchResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SearchError::backend(std::io::Error::other(
                "search index unavailable",
            )));
        }
        Ok(())
    }

    fn upsert(&self, index: &str, documents: Vec<SearchDocument>) -> SearchResult<()> {
        self.ensure_available()?;
        let mut indexes = self.indexes.write().map_err(lock_error)?;
        let docs = indexes.entry(index.to_owned()).or_default();
        for SearchDocument { id, body } in documents {
            docs.insert(id, body);
        }
        Ok(())
    }
}

fn lock_error(err: impl std::fmt::Display) -> SearchError {
    SearchError::backend(std::io::Error::other(err.to_string()))
}

fn matches(body: &Value, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    body.as_object().is_some_and(|fields| {
        fields
            .values()
            .filter_map(Value::as_str)
            .any(|text| text.to_lowercase().contains(needle))
    })
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn index(&self, index: &str, documents: Vec<SearchDocument>) -> SearchResult<()> {
        self.upsert(index, documents)
    }

    async fn update(&self, index: &str, documents: Vec<SearchDocument>) -> SearchResult<()> {
        self.upsert(index, documents)
    }

    async fn delete(&self, index: &str, ids: Vec<String>) -> SearchResult<()> {
        self.ensure_available()?;
        let mut indexes = self.indexes.write().map_err(lock_error)?;
        if let Some(docs) = indexes.get_mut(index) {
            for id in &ids {
                docs.remove(id);
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        query: &str,
        options: QueryOptions,
    ) -> SearchResult<Vec<Value>> {
        self.ensure_available()?;
        let needle = query.trim().to_lowercase();
        let indexes = self.indexes.read().map_err(lock_error)?;
        let hits = indexes
            .get(index)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter(|body| matches(body, &needle))
            .take(options.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(hits)
    }
}
