//! Search documents derived from domain aggregates.

mod document;

pub use document::{
    QueryOptions, SNAPSHOT_INDEX, SearchDocument, Searchable, SnapshotDocument, TASK_INDEX,
    TaskDocument,
};
