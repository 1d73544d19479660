//! Cache services.

mod read_through;

pub use read_through::{FileCache, ReadThroughCache, SnapshotCache, TaskCache};
