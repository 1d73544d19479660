//! Adapter implementations for snapshot persistence.

pub mod memory;
pub mod postgres;
