//! Search index mirror of tasks and snapshots.
//!
//! The index is eventually consistent with the relational stores: documents
//! are written after the store commits and failures are tolerated by the
//! callers. Free-text task listing is served from here.
//!
//! - Document shapes in [`domain`]
//! - The index contract in [`ports`]
//! - Index implementations in [`adapters`]
//! - Typed index access in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
