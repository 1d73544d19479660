//! Adapter implementations for file ports.

pub mod memory;
