//! Port contracts for snapshot persistence.

pub mod repository;

pub use repository::{SnapshotRepository, SnapshotRepositoryError, SnapshotRepositoryResult};
