//! Port contracts for pipeline submission.

pub mod client;

pub use client::{PipelineClient, PipelineClientError, PipelineClientResult};
