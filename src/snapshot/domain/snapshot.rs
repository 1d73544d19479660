//! Snapshot aggregate and processing status state machine.

use super::{ParseSnapshotStatusError, SnapshotDomainError, SnapshotId};
use crate::file::domain::FileId;
use crate::storage::domain::ObjectLocation;
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of a snapshot's insights artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// No processing has been requested.
    None,
    /// A pipeline run has been requested.
    Waiting,
    /// Work on the artifacts is in progress.
    Processing,
    /// Artifacts are up to date.
    Ready,
    /// The last pipeline run failed.
    Error,
}

impl SnapshotStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Waiting => "waiting",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// `none` is only ever left and `waiting` resolves to `processing`,
    /// `ready` or `error`. A `processing` snapshot may also be re-queued once
    /// its task is gone. Settled snapshots may be re-run or cleaned up.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::None, Self::Waiting)
                | (
                    Self::Waiting,
                    Self::Processing | Self::Ready | Self::Error
                )
                | (Self::Processing, Self::Waiting | Self::Ready | Self::Error)
                | (Self::Ready | Self::Error, Self::Waiting | Self::Processing)
        )
    }
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SnapshotStatus {
    type Error = ParseSnapshotStatusError;

    fn try_from(value: &str) -> Result<Self, ParseSnapshotStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "none" => Ok(Self::None),
            "waiting" => Ok(Self::Waiting),
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "error" => Ok(Self::Error),
            _ => Err(ParseSnapshotStatusError(value.to_owned())),
        }
    }
}

/// Monotonically increasing version of a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotVersion(u64);

impl SnapshotVersion {
    /// Creates a validated version number.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotDomainError::InvalidVersion`] for zero.
    pub const fn new(value: u64) -> Result<Self, SnapshotDomainError> {
        if value == 0 {
            return Err(SnapshotDomainError::InvalidVersion);
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Artifacts produced by a successful insights pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightsArtifacts {
    /// Entities JSON object.
    pub entities: Option<ObjectLocation>,
    /// Extracted text object.
    pub text: Option<ObjectLocation>,
    /// Searchable OCR document.
    pub ocr: Option<ObjectLocation>,
}

/// Snapshot aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    id: SnapshotId,
    file_id: FileId,
    version: SnapshotVersion,
    original: Option<ObjectLocation>,
    preview: Option<ObjectLocation>,
    text: Option<ObjectLocation>,
    ocr: Option<ObjectLocation>,
    entities: Option<ObjectLocation>,
    status: SnapshotStatus,
    language: Option<String>,
    task_id: Option<TaskId>,
    create_time: DateTime<Utc>,
    update_time: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSnapshotData {
    /// Persisted snapshot identifier.
    pub id: SnapshotId,
    /// Owning file.
    pub file_id: FileId,
    /// Persisted version.
    pub version: SnapshotVersion,
    /// Original upload.
    pub original: Option<ObjectLocation>,
    /// Preview rendition.
    pub preview: Option<ObjectLocation>,
    /// Extracted text.
    pub text: Option<ObjectLocation>,
    /// OCR document.
    pub ocr: Option<ObjectLocation>,
    /// Entities JSON.
    pub entities: Option<ObjectLocation>,
    /// Persisted processing status.
    pub status: SnapshotStatus,
    /// Persisted language id.
    pub language: Option<String>,
    /// Task currently working on the snapshot.
    pub task_id: Option<TaskId>,
    /// Persisted creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Persisted update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Creates the snapshot of a newly committed file version.
    #[must_use]
    pub fn new(
        file_id: FileId,
        version: SnapshotVersion,
        original: ObjectLocation,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: SnapshotId::new(),
            file_id,
            version,
            original: Some(original),
            preview: None,
            text: None,
            ocr: None,
            entities: None,
            status: SnapshotStatus::None,
            language: None,
            task_id: None,
            create_time: clock.utc(),
            update_time: None,
        }
    }

    /// Reconstructs a snapshot from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSnapshotData) -> Self {
        Self {
            id: data.id,
            file_id: data.file_id,
            version: data.version,
            original: data.original,
            preview: data.preview,
            text: data.text,
            ocr: data.ocr,
            entities: data.entities,
            status: data.status,
            language: data.language,
            task_id: data.task_id,
            create_time: data.create_time,
            update_time: data.update_time,
        }
    }

    /// Returns the snapshot identifier.
    #[must_use]
    pub const fn id(&self) -> SnapshotId {
        self.id
    }

    /// Returns the owning file.
    #[must_use]
    pub const fn file_id(&self) -> FileId {
        self.file_id
    }

    /// Returns the version number.
    #[must_use]
    pub const fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// Returns the original upload location.
    #[must_use]
    pub const fn original(&self) -> Option<&ObjectLocation> {
        self.original.as_ref()
    }

    /// Returns the preview rendition location.
    #[must_use]
    pub const fn preview(&self) -> Option<&ObjectLocation> {
        self.preview.as_ref()
    }

    /// Returns the extracted text location.
    #[must_use]
    pub const fn text(&self) -> Option<&ObjectLocation> {
        self.text.as_ref()
    }

    /// Returns the OCR document location.
    #[must_use]
    pub const fn ocr(&self) -> Option<&ObjectLocation> {
        self.ocr.as_ref()
    }

    /// Returns the entities JSON location.
    #[must_use]
    pub const fn entities(&self) -> Option<&ObjectLocation> {
        self.entities.as_ref()
    }

    /// Returns the processing status.
    #[must_use]
    pub const fn status(&self) -> SnapshotStatus {
        self.status
    }

    /// Returns the language the insights were requested in.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the task currently referencing this snapshot.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn update_time(&self) -> Option<DateTime<Utc>> {
        self.update_time
    }

    /// Returns whether entities have been extracted.
    #[must_use]
    pub const fn has_entities(&self) -> bool {
        self.entities.is_some()
    }

    /// Returns whether text has been extracted.
    #[must_use]
    pub const fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Returns whether an OCR document exists.
    #[must_use]
    pub const fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Sets the preview rendition.
    pub fn set_preview(&mut self, preview: ObjectLocation, clock: &impl Clock) {
        self.preview = Some(preview);
        self.touch(clock);
    }

    /// Sets the language for the next pipeline run.
    pub fn set_language(&mut self, language: impl Into<String>, clock: &impl Clock) {
        self.language = Some(language.into());
        self.touch(clock);
    }

    /// References the task working on this snapshot.
    pub fn attach_task(&mut self, task_id: TaskId, clock: &impl Clock) {
        self.task_id = Some(task_id);
        self.touch(clock);
    }

    /// Drops the task reference.
    pub fn detach_task(&mut self, clock: &impl Clock) {
        self.task_id = None;
        self.touch(clock);
    }

    /// Stores the artifacts produced by a pipeline run.
    ///
    /// Absent artifacts keep their previous value.
    pub fn record_insights(&mut self, artifacts: InsightsArtifacts, clock: &impl Clock) {
        let InsightsArtifacts {
            entities,
            text,
            ocr,
        } = artifacts;
        if entities.is_some() {
            self.entities = entities;
        }
        if text.is_some() {
            self.text = text;
        }
        if ocr.is_some() {
            self.ocr = ocr;
        }
        self.touch(clock);
    }

    /// Drops the entities pointer.
    pub fn clear_entities(&mut self, clock: &impl Clock) {
        self.entities = None;
        self.touch(clock);
    }

    /// Drops the extracted text pointer.
    pub fn clear_text(&mut self, clock: &impl Clock) {
        self.text = None;
        self.touch(clock);
    }

    /// Moves the snapshot to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotDomainError::InvalidStatusTransition`] when the
    /// state machine does not allow the move.
    pub fn transition_to(
        &mut self,
        target: SnapshotStatus,
        clock: &impl Clock,
    ) -> Result<(), SnapshotDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(SnapshotDomainError::InvalidStatusTransition {
                snapshot_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.update_time = Some(clock.utc());
    }
}
