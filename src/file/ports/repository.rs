//! Repository port for file persistence and lookup.

use crate::file::domain::{File, FileId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for file repository operations.
pub type FileRepositoryResult<T> = Result<T, FileRepositoryError>;

/// File persistence contract.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Stores a new file.
    ///
    /// # Errors
    ///
    /// Returns [`FileRepositoryError::DuplicateFile`] when the identifier
    /// already exists.
    async fn store(&self, file: &File) -> FileRepositoryResult<()>;

    /// Persists changes to an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`FileRepositoryError::NotFound`] when the file does not exist.
    async fn update(&self, file: &File) -> FileRepositoryResult<()>;

    /// Finds a file by identifier.
    ///
    /// Returns `None` when the file does not exist.
    async fn find_by_id(&self, id: FileId) -> FileRepositoryResult<Option<File>>;
}

/// Errors returned by file repository implementations.
#[derive(Debug, Clone, Error)]
pub enum FileRepositoryError {
    /// A file with the same identifier already exists.
    #[error("duplicate file identifier: {0}")]
    DuplicateFile(FileId),

    /// The file was not found.
    #[error("file not found: {0}")]
    NotFound(FileId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl FileRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
