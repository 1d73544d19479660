//! In-memory adapters for snapshot persistence.

mod snapshot;

pub use snapshot::InMemorySnapshotRepository;
