//! Typed mirror of one aggregate type into its search index.

use crate::search::{
    domain::{QueryOptions, SearchDocument, Searchable},
    ports::{SearchError, SearchIndex, SearchResult},
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Writes and queries the documents of aggregate `E`.
pub struct SearchMirror<E> {
    index: Arc<dyn SearchIndex>,
    entry: PhantomData<fn() -> E>,
}

impl<E> Clone for SearchMirror<E> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            entry: PhantomData,
        }
    }
}

impl<E: Searchable> SearchMirror<E> {
    /// Creates a mirror writing to `index`.
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            entry: PhantomData,
        }
    }

    /// Indexes new aggregates.
    ///
    /// # Errors
    ///
    /// Returns codec or backend errors.
    pub async fn index(&self, values: &[E]) -> SearchResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.index.index(E::INDEX, documents(values)?).await
    }

    /// Re-indexes changed aggregates.
    ///
    /// # Errors
    ///
    /// Returns codec or backend errors.
    pub async fn update(&self, values: &[E]) -> SearchResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.index.update(E::INDEX, documents(values)?).await
    }

    /// Removes documents by id.
    ///
    /// # Errors
    ///
    /// Returns backend errors.
    pub async fn delete(&self, ids: Vec<String>) -> SearchResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.index.delete(E::INDEX, ids).await
    }

    /// Returns the documents matching `query`.
    ///
    /// # Errors
    ///
    /// Returns codec or backend errors.
    pub async fn query(&self, query: &str, options: QueryOptions) -> SearchResult<Vec<E::Document>> {
        self.index
            .query(E::INDEX, query, options)
            .await?
            .into_iter()
            .map(|hit| serde_json::from_value(hit).map_err(SearchError::codec))
            .collect()
    }
}

fn documents<E: Searchable>(values: &[E]) -> SearchResult<Vec<SearchDocument>> {
    values
        .iter()
        .map(|value| {
            let body = serde_json::to_value(value.to_document()).map_err(SearchError::codec)?;
            Ok(SearchDocument {
                id: value.document_id(),
                body,
            })
        })
        .collect()
}
