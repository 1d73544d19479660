//! Unit tests for the search module.
