//! Diesel row models for snapshot persistence.

use super::schema::snapshots;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for snapshot records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = snapshots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SnapshotRow {
    /// Snapshot identifier.
    pub id: uuid::Uuid,
    /// Owning file identifier.
    pub file_id: uuid::Uuid,
    /// Version number.
    pub version: i64,
    /// Original upload location.
    pub original: Option<Value>,
    /// Preview rendition location.
    pub preview: Option<Value>,
    /// Extracted text location.
    pub text: Option<Value>,
    /// OCR document location.
    pub ocr: Option<Value>,
    /// Entities JSON location.
    pub entities: Option<Value>,
    /// Processing status.
    pub status: String,
    /// Requested language id.
    pub language: Option<String>,
    /// Task currently working on the snapshot.
    pub task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}

/// Insert model for snapshot records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = snapshots)]
pub struct NewSnapshotRow {
    /// Snapshot identifier.
    pub id: uuid::Uuid,
    /// Owning file identifier.
    pub file_id: uuid::Uuid,
    /// Version number.
    pub version: i64,
    /// Original upload location.
    pub original: Option<Value>,
    /// Preview rendition location.
    pub preview: Option<Value>,
    /// Extracted text location.
    pub text: Option<Value>,
    /// OCR document location.
    pub ocr: Option<Value>,
    /// Entities JSON location.
    pub entities: Option<Value>,
    /// Processing status.
    pub status: String,
    /// Requested language id.
    pub language: Option<String>,
    /// Task currently working on the snapshot.
    pub task_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}

/// Mutable snapshot columns written on update.
///
/// `None` values are written as `NULL` so cleared artifacts and detached
/// tasks persist.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = snapshots)]
#[diesel(treat_none_as_null = true)]
pub struct SnapshotChangeset {
    /// Preview rendition location.
    pub preview: Option<Value>,
    /// Extracted text location.
    pub text: Option<Value>,
    /// OCR document location.
    pub ocr: Option<Value>,
    /// Entities JSON location.
    pub entities: Option<Value>,
    /// Processing status.
    pub status: String,
    /// Requested language id.
    pub language: Option<String>,
    /// Task currently working on the snapshot.
    pub task_id: Option<uuid::Uuid>,
    /// Last update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}
