//! Unit tests for the snapshot module.
