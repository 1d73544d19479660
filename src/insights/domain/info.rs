//! Availability summary of a file's insights.

use crate::snapshot::domain::{Snapshot, SnapshotStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether insights exist for a file and which snapshot they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsInfo {
    /// Whether any snapshot of the file has entities.
    pub is_available: bool,
    /// Whether the insights come from an older snapshot than the current one.
    pub is_outdated: bool,
    /// Snapshot the insights belong to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotSummary>,
}

impl InsightsInfo {
    /// Info for a file without insights in any snapshot.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            is_available: false,
            is_outdated: false,
            snapshot: None,
        }
    }

    /// Info for insights found on `snapshot`.
    #[must_use]
    pub fn available(snapshot: &Snapshot, is_outdated: bool) -> Self {
        Self {
            is_available: true,
            is_outdated,
            snapshot: Some(SnapshotSummary::from(snapshot)),
        }
    }
}

/// Client-facing view of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    /// Snapshot identifier.
    pub id: String,
    /// Version number.
    pub version: u64,
    /// Processing status.
    pub status: SnapshotStatus,
    /// Language the insights were extracted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Task working on the snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Whether entities exist.
    pub has_entities: bool,
    /// Whether extracted text exists.
    pub has_text: bool,
    /// Whether an OCR document exists.
    pub has_ocr: bool,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl From<&Snapshot> for SnapshotSummary {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            id: snapshot.id().to_string(),
            version: snapshot.version().value(),
            status: snapshot.status(),
            language: snapshot.language().map(str::to_owned),
            task_id: snapshot.task_id().map(|id| id.to_string()),
            has_entities: snapshot.has_entities(),
            has_text: snapshot.has_text(),
            has_ocr: snapshot.has_ocr(),
            create_time: snapshot.create_time(),
            update_time: snapshot.update_time(),
        }
    }
}
