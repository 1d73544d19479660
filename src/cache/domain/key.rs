//! Key prefixes and identities of cacheable aggregates.

use crate::file::domain::{File, FileId};
use crate::snapshot::domain::{Snapshot, SnapshotId};
use crate::task::domain::{Task, TaskId};
use std::fmt;

/// An aggregate that can be stored in the cache under a prefixed key.
pub trait Cacheable {
    /// Prefix shared by every key of this aggregate type.
    const KEY_PREFIX: &'static str;

    /// Identifier used to build cache keys.
    type Id: fmt::Display + Copy + Send + Sync + 'static;

    /// Returns the identifier of this value.
    fn cache_id(&self) -> Self::Id;

    /// Builds the cache key for `id`.
    #[must_use]
    fn cache_key(id: Self::Id) -> String {
        format!("{}{id}", Self::KEY_PREFIX)
    }
}

impl Cacheable for File {
    const KEY_PREFIX: &'static str = "file:";
    type Id = FileId;

    fn cache_id(&self) -> FileId {
        self.id()
    }
}

impl Cacheable for Snapshot {
    const KEY_PREFIX: &'static str = "snapshot:";
    type Id = SnapshotId;

    fn cache_id(&self) -> SnapshotId {
        self.id()
    }
}

impl Cacheable for Task {
    const KEY_PREFIX: &'static str = "task:";
    type Id = TaskId;

    fn cache_id(&self) -> TaskId {
        self.id()
    }
}
