//! Adapter implementations for the search index port.

mod memory;

pub use memory::InMemorySearchIndex;
