//! Background task records for Strata.
//!
//! A task is the user-visible handle of an asynchronous unit of work such as
//! an insights pipeline run or an insights cleanup. Tasks carry progress,
//! an error message and a small string payload, and their status only ever
//! moves forward. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
