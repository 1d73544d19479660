//! Unit tests for the cache module.
