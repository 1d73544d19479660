//! Authorization guard port.

use crate::file::domain::{File, FileId, Permission, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for guard checks.
pub type GuardResult<T> = Result<T, GuardError>;

/// Decides whether a user holds a permission on a file.
#[async_trait]
pub trait FileGuard: Send + Sync {
    /// Returns whether `user_id` holds at least `permission` on `file`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Backend`] when the permission source cannot be
    /// read.
    async fn is_authorized(
        &self,
        user_id: UserId,
        file: &File,
        permission: Permission,
    ) -> GuardResult<bool>;

    /// Fails unless `user_id` holds at least `permission` on `file`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Forbidden`] when the permission is missing.
    async fn authorize(
        &self,
        user_id: UserId,
        file: &File,
        permission: Permission,
    ) -> GuardResult<()> {
        if self.is_authorized(user_id, file, permission).await? {
            return Ok(());
        }
        Err(GuardError::Forbidden {
            user_id,
            file_id: file.id(),
            required: permission,
        })
    }
}

/// Errors returned by guard implementations.
#[derive(Debug, Clone, Error)]
pub enum GuardError {
    /// The user lacks the required permission.
    #[error("user {user_id} lacks {required} permission on file {file_id}")]
    Forbidden {
        /// User that was checked.
        user_id: UserId,
        /// File that was checked.
        file_id: FileId,
        /// Permission that was required.
        required: Permission,
    },

    /// The permission source failed.
    #[error("guard backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl GuardError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
