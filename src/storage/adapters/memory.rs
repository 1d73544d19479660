//! In-memory object storage for tests and local flows.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::storage::{
    domain::ObjectLocation,
    ports::{ObjectStorage, ObjectStorageError, ObjectStorageResult},
};

/// Thread-safe in-memory object store.
///
/// Removal failures can be injected per location to exercise partial
/// cleanup paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStorage {
    state: Arc<RwLock<InMemoryStorageState>>,
}

#[derive(Debug, Default)]
struct InMemoryStorageState {
    objects: HashMap<ObjectLocation, Vec<u8>>,
    failing_removals: HashSet<ObjectLocation>,
}

impl InMemoryObjectStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later removal of `location` fail.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::Backend`] when lock acquisition fails.
    pub fn fail_removal_of(&self, location: ObjectLocation) -> ObjectStorageResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing_removals.insert(location);
        Ok(())
    }

    /// Returns whether an object exists at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::Backend`] when lock acquisition fails.
    pub fn contains(&self, location: &ObjectLocation) -> ObjectStorageResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.objects.contains_key(location))
    }
}

fn lock_error(err: impl std::fmt::Display) -> ObjectStorageError {
    ObjectStorageError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put_object(
        &self,
        location: &ObjectLocation,
        bytes: Vec<u8>,
    ) -> ObjectStorageResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.objects.insert(location.clone(), bytes);
        Ok(())
    }

    async fn get_object(&self, location: &ObjectLocation) -> ObjectStorageResult<Vec<u8>> {
        let state = self.state.read().map_err(lock_error)?;
        state
            .objects
            .get(location)
            .cloned()
            .ok_or_else(|| ObjectStorageError::NotFound(location.clone()))
    }

    async fn remove_object(&self, location: &ObjectLocation) -> ObjectStorageResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.failing_removals.contains(location) {
            return Err(ObjectStorageError::backend(std::io::Error::other(format!(
                "removal of {location} rejected"
            ))));
        }
        state.objects.remove(location);
        Ok(())
    }
}
