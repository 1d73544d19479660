//! Submission of processing pipelines to the external conversion worker.
//!
//! The worker runs OCR, text extraction and entity extraction for a snapshot
//! and reports progress and completion out-of-band. Submission is
//! fire-and-forget: an accepted request only means the worker queued it.
//!
//! - Run requests and completion reports in [`domain`]
//! - The client contract in [`ports`]
//! - Client implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
