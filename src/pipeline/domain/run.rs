//! Run request sent to the conversion worker.

use crate::snapshot::domain::SnapshotId;
use crate::storage::domain::ObjectLocation;
use crate::task::domain::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Payload key carrying the requested language id.
pub const PAYLOAD_LANGUAGE_KEY: &str = "language";

/// Named pipeline understood by the conversion worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineId {
    /// OCR, text and entity extraction.
    Insights,
}

impl PipelineId {
    /// Returns the wire name of the pipeline.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insights => "insights",
        }
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to run a pipeline over one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunOptions {
    /// Pipeline to run.
    pub pipeline_id: PipelineId,
    /// Task tracking the run.
    pub task_id: TaskId,
    /// Snapshot receiving the artifacts.
    pub snapshot_id: SnapshotId,
    /// Bucket of the input object.
    pub bucket: String,
    /// Key of the input object.
    pub key: String,
    /// Pipeline-specific parameters.
    pub payload: BTreeMap<String, String>,
}

impl PipelineRunOptions {
    /// Builds an insights run over `input` in `language`.
    #[must_use]
    pub fn insights(
        task_id: TaskId,
        snapshot_id: SnapshotId,
        input: &ObjectLocation,
        language: &str,
    ) -> Self {
        Self {
            pipeline_id: PipelineId::Insights,
            task_id,
            snapshot_id,
            bucket: input.bucket().to_owned(),
            key: input.key().to_owned(),
            payload: BTreeMap::from([(PAYLOAD_LANGUAGE_KEY.to_owned(), language.to_owned())]),
        }
    }
}
