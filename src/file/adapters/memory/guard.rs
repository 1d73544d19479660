//! In-memory access guard backed by explicit grants.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::file::{
    domain::{File, FileId, Permission, UserId},
    ports::{FileGuard, GuardError, GuardResult},
};

/// Guard that answers from a table of `(user, file) -> permission` grants.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileGuard {
    grants: Arc<RwLock<HashMap<(UserId, FileId), Permission>>>,
}

impl InMemoryFileGuard {
    /// Creates a guard with no grants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `permission` on `file_id` to `user_id`, replacing any previous
    /// grant.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Backend`] when lock acquisition fails.
    pub fn grant(
        &self,
        user_id: UserId,
        file_id: FileId,
        permission: Permission,
    ) -> GuardResult<()> {
        let mut grants = self
            .grants
            .write()
            .map_err(|err| GuardError::backend(std::io::Error::other(err.to_string())))?;
        grants.insert((user_id, file_id), permission);
        Ok(())
    }
}

#[async_trait]
impl FileGuard for InMemoryFileGuard {
    async fn is_authorized(
        &self,
        user_id: UserId,
        file: &File,
        permission: Permission,
    ) -> GuardResult<bool> {
        let grants = self
            .grants
            .read()
            .map_err(|err| GuardError::backend(std::io::Error::other(err.to_string())))?;
        Ok(grants
            .get(&(user_id, file.id()))
            .is_some_and(|held| held.satisfies(permission)))
    }
}
