//! Service-level error taxonomy and its client-facing representation.

use crate::cache::ports::CacheError;
use crate::file::{
    domain::{FileId, Permission, UserId},
    ports::{FileRepositoryError, GuardError},
};
use crate::insights::domain::ListingError;
use crate::pipeline::ports::PipelineClientError;
use crate::search::ports::SearchError;
use crate::snapshot::{
    domain::{SnapshotDomainError, SnapshotId},
    ports::SnapshotRepositoryError,
};
use crate::storage::{domain::ObjectLocation, ports::ObjectStorageError};
use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Result type for insights operations.
pub type InsightsResult<T> = Result<T, InsightsError>;

/// Broad classification of an [`InsightsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The caller lacks the required permission.
    Forbidden,
    /// The records are in a state that does not allow the operation.
    InvalidState,
    /// A derived artifact is missing from object storage.
    StorageMissing,
    /// The request itself is malformed.
    Validation,
    /// An infrastructure dependency failed.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code conventionally used for this kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound | Self::StorageMissing => 404,
            Self::Forbidden => 403,
            Self::InvalidState | Self::Validation => 400,
            Self::Internal => 500,
        }
    }
}

/// Errors raised by the insights orchestrator.
#[derive(Debug, Clone, Error)]
pub enum InsightsError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(FileId),

    /// The snapshot does not exist.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Neither the current nor any previous snapshot carries insights.
    #[error("insights not found for file {0}")]
    InsightsNotFound(FileId),

    /// The caller lacks the permission required by the operation.
    #[error("user {user_id} lacks {required} permission on file {file_id}")]
    Forbidden {
        /// Calling user.
        user_id: UserId,
        /// Target file.
        file_id: FileId,
        /// Permission the operation needs.
        required: Permission,
    },

    /// The target is a folder or has no current snapshot.
    #[error("file {0} is not a file with content")]
    FileIsNotAFile(FileId),

    /// A non-terminal task is already working on the snapshot.
    #[error("snapshot {0} has a pending task")]
    SnapshotHasPendingTask(SnapshotId),

    /// No previous snapshot carries a language to re-run with.
    #[error("snapshot {0} cannot be patched")]
    SnapshotCannotBePatched(SnapshotId),

    /// A pipeline report targets a task the snapshot no longer references.
    #[error("report of task {task_id} is stale for snapshot {snapshot_id}")]
    StaleReport {
        /// Reporting task.
        task_id: TaskId,
        /// Snapshot named in the report.
        snapshot_id: SnapshotId,
    },

    /// The snapshot lacks the rendition the pipeline reads from.
    #[error("snapshot {0} has no rendition to process")]
    RenditionMissing(SnapshotId),

    /// The snapshot does not reference the requested artifact.
    #[error("snapshot {snapshot_id} has no {artifact} object")]
    ArtifactMissing {
        /// Snapshot that was searched.
        snapshot_id: SnapshotId,
        /// Artifact name.
        artifact: &'static str,
    },

    /// The referenced object is absent from storage.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectLocation),

    /// The language id is not in the catalog.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Entity list options are invalid.
    #[error(transparent)]
    InvalidListOptions(#[from] ListingError),

    /// A snapshot state change was rejected.
    #[error(transparent)]
    Snapshot(#[from] SnapshotDomainError),

    /// A task state change was rejected.
    #[error(transparent)]
    Task(#[from] TaskDomainError),

    /// The pipeline worker refused or could not receive the run.
    #[error(transparent)]
    Pipeline(#[from] PipelineClientError),

    /// The file store failed.
    #[error(transparent)]
    FileStore(#[from] FileRepositoryError),

    /// The snapshot store failed.
    #[error(transparent)]
    SnapshotStore(#[from] SnapshotRepositoryError),

    /// The task store failed.
    #[error(transparent)]
    TaskStore(#[from] TaskRepositoryError),

    /// The cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The search index failed.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Object storage failed.
    #[error(transparent)]
    Storage(ObjectStorageError),

    /// The authorization backend failed.
    #[error(transparent)]
    Guard(GuardError),

    /// The entities object could not be decoded.
    #[error("entities decode error: {0}")]
    EntitiesDecode(Arc<serde_json::Error>),

    /// Internal coordination failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<GuardError> for InsightsError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Forbidden {
                user_id,
                file_id,
                required,
            } => Self::Forbidden {
                user_id,
                file_id,
                required,
            },
            GuardError::Backend(_) => Self::Guard(err),
        }
    }
}

impl From<ObjectStorageError> for InsightsError {
    fn from(err: ObjectStorageError) -> Self {
        match err {
            ObjectStorageError::NotFound(location) => Self::ObjectNotFound(location),
            ObjectStorageError::InvalidText(_) | ObjectStorageError::Backend(_) => {
                Self::Storage(err)
            }
        }
    }
}

impl From<serde_json::Error> for InsightsError {
    fn from(err: serde_json::Error) -> Self {
        Self::EntitiesDecode(Arc::new(err))
    }
}

impl InsightsError {
    /// Maps a cache miss to `missing`, keeping every other failure.
    pub(crate) fn from_cache(err: CacheError, missing: Self) -> Self {
        match err {
            CacheError::NotFound(_) => missing,
            CacheError::Backend(_) | CacheError::Codec(_) | CacheError::Store(_) => {
                Self::Cache(err)
            }
        }
    }

    /// Returns the broad classification of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_)
            | Self::SnapshotNotFound(_)
            | Self::TaskNotFound(_)
            | Self::InsightsNotFound(_) => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::FileIsNotAFile(_)
            | Self::SnapshotHasPendingTask(_)
            | Self::SnapshotCannotBePatched(_)
            | Self::StaleReport { .. }
            | Self::Snapshot(_)
            | Self::Task(_) => ErrorKind::InvalidState,
            Self::RenditionMissing(_) | Self::ArtifactMissing { .. } | Self::ObjectNotFound(_) => {
                ErrorKind::StorageMissing
            }
            Self::UnsupportedLanguage(_) | Self::InvalidListOptions(_) => ErrorKind::Validation,
            Self::Pipeline(_)
            | Self::FileStore(_)
            | Self::SnapshotStore(_)
            | Self::TaskStore(_)
            | Self::Cache(_)
            | Self::Search(_)
            | Self::Storage(_)
            | Self::Guard(_)
            | Self::EntitiesDecode(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the stable machine-readable code of the error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "file_not_found",
            Self::SnapshotNotFound(_) => "snapshot_not_found",
            Self::TaskNotFound(_) => "task_not_found",
            Self::InsightsNotFound(_) => "insights_not_found",
            Self::Forbidden { .. } => "missing_permission",
            Self::FileIsNotAFile(_) => "file_is_not_a_file",
            Self::SnapshotHasPendingTask(_) => "snapshot_has_pending_task",
            Self::SnapshotCannotBePatched(_) => "snapshot_cannot_be_patched",
            Self::StaleReport { .. } => "stale_pipeline_report",
            Self::RenditionMissing(_) | Self::ArtifactMissing { .. } | Self::ObjectNotFound(_) => {
                "s3_object_not_found"
            }
            Self::UnsupportedLanguage(_) => "unsupported_language",
            Self::InvalidListOptions(_) => "invalid_request",
            Self::Snapshot(_) | Self::Task(_) => "invalid_status_transition",
            Self::Pipeline(_) => "pipeline_unavailable",
            Self::FileStore(_)
            | Self::SnapshotStore(_)
            | Self::TaskStore(_)
            | Self::Cache(_)
            | Self::Search(_)
            | Self::Storage(_)
            | Self::Guard(_)
            | Self::EntitiesDecode(_)
            | Self::Internal(_) => "internal_server_error",
        }
    }

    /// Returns a message suitable for end users.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "The requested item could not be found.",
            ErrorKind::Forbidden => "You do not have permission to perform this action.",
            ErrorKind::InvalidState => match self {
                Self::SnapshotHasPendingTask(_) => {
                    "Another operation is already running on this file."
                }
                Self::FileIsNotAFile(_) => "This item is not a file.",
                _ => "This action is not possible right now.",
            },
            ErrorKind::StorageMissing => "The requested content is not available.",
            ErrorKind::Validation => "The request is invalid.",
            ErrorKind::Internal => "Something went wrong, please try again later.",
        }
    }

    /// Builds the client-facing response, linking `docs_base_url`.
    #[must_use]
    pub fn to_response(&self, docs_base_url: &str) -> ErrorResponse {
        let code = self.code();
        ErrorResponse {
            code: code.to_owned(),
            status: self.kind().http_status(),
            message: self.to_string(),
            user_message: self.user_message().to_owned(),
            more_info: format!("{}/{code}", docs_base_url.trim_end_matches('/')),
        }
    }
}

/// Serialized error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable error code.
    pub code: String,
    /// HTTP status code.
    pub status: u16,
    /// Technical description.
    pub message: String,
    /// Description suitable for end users.
    pub user_message: String,
    /// Link to the error documentation.
    pub more_info: String,
}
