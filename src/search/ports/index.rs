//! Search backend port.

use crate::search::domain::{QueryOptions, SearchDocument};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Full-text search backend holding JSON documents in named indexes.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Adds documents to `index`.
    async fn index(&self, index: &str, documents: Vec<SearchDocument>) -> SearchResult<()>;

    /// Replaces existing documents in `index`.
    async fn update(&self, index: &str, documents: Vec<SearchDocument>) -> SearchResult<()>;

    /// Removes documents from `index`. Unknown ids are ignored.
    async fn delete(&self, index: &str, ids: Vec<String>) -> SearchResult<()>;

    /// Returns the bodies of documents in `index` matching `query`.
    async fn query(
        &self,
        index: &str,
        query: &str,
        options: QueryOptions,
    ) -> SearchResult<Vec<Value>>;
}

/// Errors returned by search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The search backend failed.
    #[error("search backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),

    /// A document could not be encoded or decoded.
    #[error("search codec error: {0}")]
    Codec(Arc<dyn std::error::Error + Send + Sync>),
}

impl SearchError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Wraps a serialisation error.
    pub fn codec(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Codec(Arc::new(err))
    }
}
