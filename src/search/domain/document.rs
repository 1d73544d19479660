//! Indexed document shapes and the mapping from aggregates.

use crate::snapshot::domain::Snapshot;
use crate::task::domain::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Index holding task documents.
pub const TASK_INDEX: &str = "task";

/// Index holding snapshot documents.
pub const SNAPSHOT_INDEX: &str = "snapshot";

/// A document as handed to the search backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    /// Document identifier, unique within its index.
    pub id: String,
    /// JSON body.
    pub body: Value,
}

/// Options applied to a free-text query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum number of hits, unbounded when `None`.
    pub limit: Option<usize>,
}

/// An aggregate mirrored into a search index.
pub trait Searchable {
    /// Name of the index holding this aggregate.
    const INDEX: &'static str;

    /// Indexed representation.
    type Document: Serialize + DeserializeOwned + Send + Sync;

    /// Maps the aggregate to its indexed representation.
    fn to_document(&self) -> Self::Document;

    /// Returns the document identifier.
    fn document_id(&self) -> String;
}

/// Indexed view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    /// Task identifier.
    pub id: String,
    /// Task name.
    pub name: String,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last reported progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
    /// Indeterminate progress flag.
    pub is_indeterminate: bool,
    /// Owning user.
    pub user_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Searchable for Task {
    const INDEX: &'static str = TASK_INDEX;
    type Document = TaskDocument;

    fn to_document(&self) -> TaskDocument {
        TaskDocument {
            id: self.id().to_string(),
            name: self.name().to_owned(),
            error: self.error().map(str::to_owned),
            percentage: self.percentage(),
            is_indeterminate: self.is_indeterminate(),
            user_id: self.user_id().to_string(),
            status: self.status().as_str().to_owned(),
            create_time: self.create_time(),
            update_time: self.update_time(),
        }
    }

    fn document_id(&self) -> String {
        self.id().to_string()
    }
}

/// Indexed view of a snapshot's processing state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    /// Snapshot identifier.
    pub id: String,
    /// Owning file.
    pub file_id: String,
    /// Version number.
    pub version: u64,
    /// Processing status.
    pub status: String,
    /// Requested language id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Task working on the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Whether entities exist.
    pub has_entities: bool,
    /// Whether extracted text exists.
    pub has_text: bool,
    /// Whether an OCR document exists.
    pub has_ocr: bool,
}

impl Searchable for Snapshot {
    const INDEX: &'static str = SNAPSHOT_INDEX;
    type Document = SnapshotDocument;

    fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            id: self.id().to_string(),
            file_id: self.file_id().to_string(),
            version: self.version().value(),
            status: self.status().as_str().to_owned(),
            language: self.language().map(str::to_owned),
            task_id: self.task_id().map(|id| id.to_string()),
            has_entities: self.has_entities(),
            has_text: self.has_text(),
            has_ocr: self.has_ocr(),
        }
    }

    fn document_id(&self) -> String {
        self.id().to_string()
    }
}
