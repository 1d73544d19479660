//! Adapter implementations for the cache backend port.

mod moka_backend;

pub use moka_backend::MokaCacheBackend;
