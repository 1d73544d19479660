//! Typed access to the search index.

mod mirror;

pub use mirror::SearchMirror;
