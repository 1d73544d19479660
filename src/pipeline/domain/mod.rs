//! Pipeline run requests and completion reports.

mod report;
mod run;

pub use report::{PipelineOutcome, PipelineReport};
pub use run::{PAYLOAD_LANGUAGE_KEY, PipelineId, PipelineRunOptions};
