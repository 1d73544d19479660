//! Port contracts for the search backend.

pub mod index;

pub use index::{SearchError, SearchIndex, SearchResult};
