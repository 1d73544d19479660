//! Versioned snapshot metadata for Strata files.
//!
//! Every committed file version produces a snapshot that points at its stored
//! renditions and derived insights artifacts, and tracks the processing
//! status of the pipeline run that produces those artifacts. Status changes
//! are validated against an explicit transition table. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
