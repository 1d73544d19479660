//! Port contracts for object storage.

pub mod object_storage;

pub use object_storage::{ObjectStorage, ObjectStorageError, ObjectStorageResult};
