//! Unit tests for the insights module.
