//! Object storage port.

use crate::storage::domain::ObjectLocation;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for object storage operations.
pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

/// Minimal object storage contract used by the insights core.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Writes an object, replacing any existing object at the location.
    async fn put_object(&self, location: &ObjectLocation, bytes: Vec<u8>)
    -> ObjectStorageResult<()>;

    /// Reads an object's raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::NotFound`] when no object exists.
    async fn get_object(&self, location: &ObjectLocation) -> ObjectStorageResult<Vec<u8>>;

    /// Reads an object as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::NotFound`] when no object exists or
    /// [`ObjectStorageError::InvalidText`] when the bytes are not UTF-8.
    async fn get_text(&self, location: &ObjectLocation) -> ObjectStorageResult<String> {
        let bytes = self.get_object(location).await?;
        String::from_utf8(bytes).map_err(|_| ObjectStorageError::InvalidText(location.clone()))
    }

    /// Removes an object. Removing a missing object succeeds.
    async fn remove_object(&self, location: &ObjectLocation) -> ObjectStorageResult<()>;
}

/// Errors returned by object storage adapters.
#[derive(Debug, Clone, Error)]
pub enum ObjectStorageError {
    /// No object exists at the location.
    #[error("object not found: {0}")]
    NotFound(ObjectLocation),

    /// The object is not valid UTF-8 text.
    #[error("object is not valid UTF-8 text: {0}")]
    InvalidText(ObjectLocation),

    /// Backend failure.
    #[error("object storage error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl ObjectStorageError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
