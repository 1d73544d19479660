//! In-memory repository for files.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::file::{
    domain::{File, FileId},
    ports::{FileRepository, FileRepositoryError, FileRepositoryResult},
};

/// Thread-safe in-memory file repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileRepository {
    files: Arc<RwLock<HashMap<FileId, File>>>,
}

impl InMemoryFileRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> FileRepositoryError {
    FileRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn store(&self, file: &File) -> FileRepositoryResult<()> {
        let mut files = self.files.write().map_err(lock_error)?;
        if files.contains_key(&file.id()) {
            return Err(FileRepositoryError::DuplicateFile(file.id()));
        }
        files.insert(file.id(), file.clone());
        Ok(())
    }

    async fn update(&self, file: &File) -> FileRepositoryResult<()> {
        let mut files = self.files.write().map_err(lock_error)?;
        let stored = files
            .get_mut(&file.id())
            .ok_or(FileRepositoryError::NotFound(file.id()))?;
        *stored = file.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: FileId) -> FileRepositoryResult<Option<File>> {
        let files = self.files.read().map_err(lock_error)?;
        Ok(files.get(&id).cloned())
    }
}
