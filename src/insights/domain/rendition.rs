//! Choice of the rendition fed to the insights pipeline.

use crate::snapshot::domain::Snapshot;
use crate::storage::domain::{MediaIdentifier, ObjectLocation};

/// Returns the object the insights pipeline should read.
///
/// Office and plain-text originals are read through their preview
/// rendition, every other original directly. Returns `None` when the
/// required object is absent.
#[must_use]
pub fn pipeline_input(snapshot: &Snapshot, media: MediaIdentifier) -> Option<&ObjectLocation> {
    let original = snapshot.original()?;
    if media.is_office(original.key()) || media.is_plain_text(original.key()) {
        snapshot.preview()
    } else {
        Some(original)
    }
}
