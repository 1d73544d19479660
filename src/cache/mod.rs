//! Read-through cache in front of the file, snapshot and task stores.
//!
//! Entries are JSON documents stored under prefixed keys (`file:`,
//! `snapshot:`, `task:`). A cache read that misses always falls back to the
//! owning store and repopulates the entry, so callers never observe a miss
//! for a record that exists.
//!
//! - Key conventions in [`domain`]
//! - Backend and loader contracts in [`ports`]
//! - Backend implementations in [`adapters`]
//! - The read-through cache itself in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
