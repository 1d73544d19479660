//! File aggregate as seen by the insights core.

use super::{FileDomainError, FileId};
use crate::snapshot::domain::SnapshotId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Kind of a file-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Regular file with content snapshots.
    File,
    /// Folder containing other nodes.
    Folder,
}

/// File or folder record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    id: FileId,
    name: String,
    kind: FileKind,
    snapshot_id: Option<SnapshotId>,
    create_time: DateTime<Utc>,
    update_time: Option<DateTime<Utc>>,
}

impl File {
    /// Creates a regular file without a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FileDomainError::EmptyName`] when the name is blank.
    pub fn new_file(name: impl Into<String>, clock: &impl Clock) -> Result<Self, FileDomainError> {
        Self::new(name, FileKind::File, clock)
    }

    /// Creates a folder.
    ///
    /// # Errors
    ///
    /// Returns [`FileDomainError::EmptyName`] when the name is blank.
    pub fn new_folder(
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, FileDomainError> {
        Self::new(name, FileKind::Folder, clock)
    }

    fn new(
        name: impl Into<String>,
        kind: FileKind,
        clock: &impl Clock,
    ) -> Result<Self, FileDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FileDomainError::EmptyName);
        }
        Ok(Self {
            id: FileId::new(),
            name: trimmed.to_owned(),
            kind,
            snapshot_id: None,
            create_time: clock.utc(),
            update_time: None,
        })
    }

    /// Returns the file identifier.
    #[must_use]
    pub const fn id(&self) -> FileId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> FileKind {
        self.kind
    }

    /// Returns the current snapshot, if any.
    #[must_use]
    pub const fn snapshot_id(&self) -> Option<SnapshotId> {
        self.snapshot_id
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

    /// Returns the current snapshot when this node is a regular file that has
    /// content.
    #[must_use]
    pub const fn current_snapshot(&self) -> Option<SnapshotId> {
        match self.kind {
            FileKind::File => self.snapshot_id,
            FileKind::Folder => None,
        }
    }

    /// Points the file at a newly committed snapshot.
    pub fn set_snapshot(&mut self, snapshot_id: SnapshotId, clock: &impl Clock) {
        self.snapshot_id = Some(snapshot_id);
        self.update_time = Some(clock.utc());
    }
}
