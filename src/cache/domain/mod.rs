//! Cache key conventions for cached aggregates.

mod key;

pub use key::Cacheable;
