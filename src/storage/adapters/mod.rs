//! Adapter implementations for object storage ports.

mod memory;

pub use memory::InMemoryObjectStorage;
