//! Adapter implementations for the pipeline client port.

mod http;
mod recording;

pub use http::HttpPipelineClient;
pub use recording::RecordingPipelineClient;
