//! Port contracts for cache storage and store-backed loading.

pub mod backend;
pub mod loader;

pub use backend::{CacheBackend, CacheError, CacheResult};
pub use loader::CacheLoader;
