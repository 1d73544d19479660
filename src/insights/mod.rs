//! Insights orchestration for file snapshots.
//!
//! Requests pipeline runs that derive text, an OCR document and named
//! entities from a snapshot, tracks them through tasks, removes the derived
//! artifacts in the background and serves them back paginated.
//!
//! - Entities, listing options, languages and availability in [`domain`]
//! - The orchestrator, pipeline report handling and their helpers in
//!   [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
